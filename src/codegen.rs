//! Rust source generation for packet ID constants.
//!
//! Produces one file declaring a `PktId` type alias and one constant per
//! packet, grouped by phase and direction:
//!
//! ```text
//! // Clientbound packets for connections in the play state.
//! pub const SpawnEntity       : PktId = 0x00;
//! pub const ChatClientbound   : PktId = 0x0e;
//! ```
//!
//! Names are padded to the longest identifier in the whole file so every
//! `: PktId` lines up. Within a group, constants are sorted by packet ID,
//! so identical input always produces byte-identical output.

use std::fmt::Write;
use std::path::Path;

use serde_json::Value;
use tracing::info;

use crate::error::{Error, Result};
use crate::naming::parse_packet_id;
use crate::resolve::{check_unique, resolve_collisions};
use crate::schema::{Direction, PacketMapping, Phase, PhaseMappings, unpack_phase};

/// File written when no output path is given.
pub const DEFAULT_OUTPUT: &str = "packet_ids.rs";

/// Name of the generated integer type.
pub const ID_TYPE: &str = "PktId";

/// Resolved packet names for every phase that carries packets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtocolIds {
    pub login: PhaseMappings,
    pub play: PhaseMappings,
    pub status: PhaseMappings,
}

impl ProtocolIds {
    /// Phases in generation order.
    pub fn phases(&self) -> [(Phase, &PhaseMappings); 3] {
        [
            (Phase::Login, &self.login),
            (Phase::Play, &self.play),
            (Phase::Status, &self.status),
        ]
    }

    fn phase_mut(&mut self, phase: Phase) -> &mut PhaseMappings {
        match phase {
            Phase::Login => &mut self.login,
            Phase::Play => &mut self.play,
            Phase::Status => &mut self.status,
        }
    }

    /// Length of the longest identifier across every phase and direction.
    pub fn max_name_len(&self) -> usize {
        self.phases()
            .into_iter()
            .flat_map(|(_, m)| m.clientbound.keys().chain(m.serverbound.keys()))
            .map(|name| name.chars().count())
            .max()
            .unwrap_or(0)
    }

    /// Number of constants the generated file declares.
    pub fn declaration_count(&self) -> usize {
        self.phases().into_iter().map(|(_, m)| m.len()).sum()
    }
}

/// Statistics collected during generation for reporting.
#[derive(Debug, Default)]
pub struct GenerationStats {
    pub login_packets: usize,
    pub play_packets: usize,
    pub status_packets: usize,
    pub collisions_resolved: usize,
    pub name_width: usize,
}

impl GenerationStats {
    pub fn total_packets(&self) -> usize {
        self.login_packets + self.play_packets + self.status_packets
    }
}

/// Extract and resolve packet names for all phases of a decoded schema.
///
/// Fails on the first phase whose shape does not match; nothing is written.
pub fn collect_ids(doc: &Value) -> Result<(ProtocolIds, usize)> {
    let mut ids = ProtocolIds::default();
    let mut collisions_resolved = 0;

    for phase in Phase::ALL {
        let resolution = resolve_collisions(phase, unpack_phase(doc, phase)?)?;
        info!(
            %phase,
            clientbound = resolution.mappings.clientbound.len(),
            serverbound = resolution.mappings.serverbound.len(),
            collisions = resolution.collisions.len(),
            "resolved phase"
        );
        collisions_resolved += resolution.collisions.len();
        *ids.phase_mut(phase) = resolution.mappings;
    }

    check_unique(ids.phases())?;
    Ok((ids, collisions_resolved))
}

/// Generate the packet ID file for `doc` and write it to `output`.
///
/// The whole file is rendered before `output` is touched, so any schema
/// error leaves a previously generated file in place.
pub fn generate(doc: &Value, output: &Path) -> Result<GenerationStats> {
    let (ids, collisions_resolved) = collect_ids(doc)?;
    let source = render(&ids);
    write_file(output, &source)?;

    let stats = GenerationStats {
        login_packets: ids.login.len(),
        play_packets: ids.play.len(),
        status_packets: ids.status.len(),
        collisions_resolved,
        name_width: ids.max_name_len(),
    };
    info!(
        path = %output.display(),
        packets = stats.total_packets(),
        "wrote packet IDs"
    );
    Ok(stats)
}

/// Render the generated source file.
pub fn render(ids: &ProtocolIds) -> String {
    let width = ids.max_name_len();
    let mut out = String::new();

    writeln!(
        out,
        "// This file is automatically generated by packet-id-gen. DO NOT EDIT."
    )
    .unwrap();
    writeln!(out).unwrap();
    writeln!(out, "//! Packet IDs used on the wire.").unwrap();
    writeln!(out, "#![allow(non_upper_case_globals)]").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "// Regenerate with: cargo run --bin packet-id-gen").unwrap();
    writeln!(out).unwrap();
    writeln!(
        out,
        "/// {ID_TYPE} represents a packet ID used in the minecraft protocol."
    )
    .unwrap();
    writeln!(out, "pub type {ID_TYPE} = i32;").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "// Valid {ID_TYPE} values.").unwrap();

    for (phase, mappings) in ids.phases() {
        for direction in Direction::ALL {
            writeln!(out, "// {}", group_comment(phase, direction)).unwrap();
            for (name, id) in sorted_entries(mappings.get(direction)) {
                writeln!(out, "pub const {name:<width$}: {ID_TYPE} = {id};").unwrap();
            }
        }
        writeln!(out).unwrap();
    }

    out
}

/// Comment line placed above each direction group.
fn group_comment(phase: Phase, direction: Direction) -> &'static str {
    match (phase, direction) {
        (Phase::Login, Direction::Clientbound) => {
            "Clientbound packets for connections in the login state."
        }
        (Phase::Login, Direction::Serverbound) => {
            "Serverbound packets for connections in the login state."
        }
        (Phase::Play, Direction::Clientbound) => {
            "Clientbound packets for connections in the play state."
        }
        (Phase::Play, Direction::Serverbound) => {
            "Serverbound packets for connections in the play state."
        }
        (Phase::Status, Direction::Clientbound) => {
            "Clientbound packets used to respond to ping/status requests."
        }
        (Phase::Status, Direction::Serverbound) => {
            "Serverbound packets used to ping or read server status."
        }
    }
}

/// Entries ordered by numeric packet ID, then by name.
fn sorted_entries(mapping: &PacketMapping) -> Vec<(&str, &str)> {
    let mut entries: Vec<(&str, &str)> = mapping
        .iter()
        .map(|(name, id)| (name.as_str(), id.as_str()))
        .collect();
    entries.sort_by_key(|&(name, id)| (parse_packet_id(id), name));
    entries
}

/// Write content to a file, creating parent directories as needed.
fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::Write {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(path, content).map_err(|e| Error::Write {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}
