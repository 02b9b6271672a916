//! Protocol schema fetching and typed navigation.
//!
//! The schema is PrismarineJS `minecraft-data`'s `protocol.json`. Only one
//! path inside it matters here. For every phase and direction:
//!
//! ```text
//! <phase>.<toClient|toServer>.types.packet
//!     = ["container", [ { "name": "name",
//!                         "type": ["mapper", { "type": "varint",
//!                                              "mappings": { "0x00": "spawn_entity", ... } }] },
//!                       { "name": "params", ... } ]]
//! ```
//!
//! Each direction is decoded into the typed structs below, so any upstream
//! format change fails loudly with the phase and direction in the error.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::de::{self, IgnoredAny, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::naming::{is_identifier, normalize_name, parse_packet_id};

/// Where the schema is downloaded from when no other source is given.
///
/// Update me when moving to a new protocol version.
pub const PROTOCOL_URL: &str =
    "https://raw.githubusercontent.com/PrismarineJS/minecraft-data/master/data/pc/1.16.2/protocol.json";

/// A connection state that carries packets.
///
/// The handshaking state has no packets of interest and is never read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Login,
    Play,
    Status,
}

impl Phase {
    /// All phases in generation order.
    pub const ALL: [Phase; 3] = [Phase::Login, Phase::Play, Phase::Status];

    /// Top-level key of this phase in `protocol.json`.
    pub fn key(self) -> &'static str {
        match self {
            Phase::Login => "login",
            Phase::Play => "play",
            Phase::Status => "status",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Which endpoint sends a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Direction {
    Clientbound,
    Serverbound,
}

impl Direction {
    /// Both directions in generation order.
    pub const ALL: [Direction; 2] = [Direction::Clientbound, Direction::Serverbound];

    /// Key of this direction under a phase in `protocol.json`.
    pub fn key(self) -> &'static str {
        match self {
            Direction::Clientbound => "toClient",
            Direction::Serverbound => "toServer",
        }
    }

    /// Suffix appended to a name that both directions of a phase use.
    pub fn suffix(self) -> &'static str {
        match self {
            Direction::Clientbound => "Clientbound",
            Direction::Serverbound => "Serverbound",
        }
    }
}

/// Dotted location of one directional mapping, e.g. `play.toServer`.
pub fn mapping_path(phase: Phase, direction: Direction) -> String {
    format!("{}.{}", phase.key(), direction.key())
}

/// Normalized packet name → packet ID text, exactly as written in the schema.
pub type PacketMapping = BTreeMap<String, String>;

/// The two directional mappings of one phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseMappings {
    pub clientbound: PacketMapping,
    pub serverbound: PacketMapping,
}

impl PhaseMappings {
    /// The mapping for packets sent in `direction`.
    pub fn get(&self, direction: Direction) -> &PacketMapping {
        match direction {
            Direction::Clientbound => &self.clientbound,
            Direction::Serverbound => &self.serverbound,
        }
    }

    /// Total number of packets across both directions.
    pub fn len(&self) -> usize {
        self.clientbound.len() + self.serverbound.len()
    }

    /// Whether neither direction carries any packets.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ── Typed shape of `<phase>.<direction>` ───────────────────────────────

/// One direction of one phase. Only `types.packet` is read.
#[derive(Debug, Deserialize)]
pub struct DirectionSchema {
    pub types: DirectionTypes,
}

#[derive(Debug, Deserialize)]
pub struct DirectionTypes {
    pub packet: PacketContainer,
}

/// `["container", [<id field>, ...]]`
#[derive(Debug, Deserialize)]
pub struct PacketContainer(pub String, pub ContainerFields);

/// Fields of the packet container. Only the first one, the packet ID
/// mapper, is kept; the `params` switch that follows is skipped.
#[derive(Debug)]
pub struct ContainerFields {
    pub id: IdField,
}

impl<'de> Deserialize<'de> for ContainerFields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct FieldsVisitor;

        impl<'de> Visitor<'de> for FieldsVisitor {
            type Value = ContainerFields;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a list of container fields starting with the packet ID field")
            }

            fn visit_seq<A: SeqAccess<'de>>(
                self,
                mut seq: A,
            ) -> std::result::Result<ContainerFields, A::Error> {
                let id = seq
                    .next_element::<IdField>()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(ContainerFields { id })
            }
        }

        deserializer.deserialize_seq(FieldsVisitor)
    }
}

#[derive(Debug, Deserialize)]
pub struct IdField {
    #[serde(rename = "type")]
    pub type_: IdMapper,
}

/// `["mapper", { "type": "varint", "mappings": { ... } }]`
#[derive(Debug, Deserialize)]
pub struct IdMapper(pub String, pub MapperOptions);

#[derive(Debug, Deserialize)]
pub struct MapperOptions {
    /// Packet ID text → raw packet name.
    pub mappings: BTreeMap<String, String>,
}

impl DirectionSchema {
    /// Validate the shape tags and IDs, and normalize every packet name.
    fn into_mapping(self, path: &str) -> Result<PacketMapping> {
        let PacketContainer(container_tag, fields) = self.types.packet;
        expect_tag(path, "types.packet", "container", &container_tag)?;
        let IdMapper(mapper_tag, options) = fields.id.type_;
        expect_tag(path, "types.packet[1][0].type", "mapper", &mapper_tag)?;

        let mut out = PacketMapping::new();
        for (id, raw_name) in options.mappings {
            if parse_packet_id(&id).is_none() {
                return Err(schema_error(
                    path,
                    format!("packet ID '{id}' is not an integer literal"),
                ));
            }
            let name = normalize_name(&raw_name);
            if !is_identifier(&name) {
                return Err(schema_error(
                    path,
                    format!("packet {id}: '{raw_name}' does not make a Rust identifier ('{name}')"),
                ));
            }
            if let Some(first) = out.insert(name.clone(), id.clone()) {
                return Err(Error::DuplicateName {
                    path: path.to_string(),
                    name,
                    first,
                    second: id,
                });
            }
        }
        Ok(out)
    }
}

// ── Navigation ─────────────────────────────────────────────────────────

/// Read both directional mappings of `phase` from the decoded document.
pub fn unpack_phase(doc: &Value, phase: Phase) -> Result<PhaseMappings> {
    let phase_value = lookup(doc, phase.key(), "<root>")?;
    let mut out = PhaseMappings::default();
    for direction in Direction::ALL {
        let path = mapping_path(phase, direction);
        let value = lookup(phase_value, direction.key(), phase.key())?;
        let mapping = DirectionSchema::deserialize(value)
            .map_err(|e| schema_error(&path, e.to_string()))?
            .into_mapping(&path)?;
        debug!(%path, packets = mapping.len(), "unpacked mapping");
        match direction {
            Direction::Clientbound => out.clientbound = mapping,
            Direction::Serverbound => out.serverbound = mapping,
        }
    }
    Ok(out)
}

fn lookup<'a>(value: &'a Value, key: &str, path: &str) -> Result<&'a Value> {
    let Some(map) = value.as_object() else {
        return Err(schema_error(
            path,
            format!("expected an object, found {}", kind(value)),
        ));
    };
    map.get(key)
        .ok_or_else(|| schema_error(path, format!("key '{key}' not found")))
}

fn expect_tag(path: &str, at: &str, expected: &str, found: &str) -> Result<()> {
    if found == expected {
        Ok(())
    } else {
        Err(schema_error(
            path,
            format!("{at}: expected '{expected}', found '{found}'"),
        ))
    }
}

fn schema_error(path: &str, reason: String) -> Error {
    Error::Schema {
        path: path.to_string(),
        reason,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

// ── Loading ────────────────────────────────────────────────────────────

/// Decode a schema document from its JSON text.
pub fn parse_protocol(body: &str) -> Result<Value> {
    Ok(serde_json::from_str(body)?)
}

/// Load a schema document from a local file.
pub fn load_protocol(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_protocol(&content)
}

/// Download and decode the schema document. One GET, no retries.
#[cfg(feature = "download")]
pub async fn fetch_protocol(url: &str) -> Result<Value> {
    tracing::info!(%url, "downloading protocol schema");

    let response = reqwest::get(url).await.map_err(|e| Error::Fetch {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    if !response.status().is_success() {
        return Err(Error::Fetch {
            url: url.to_string(),
            reason: format!("server returned {}", response.status()),
        });
    }

    let body = response.text().await.map_err(|e| Error::Fetch {
        url: url.to_string(),
        reason: format!("reading response body: {e}"),
    })?;

    parse_protocol(&body)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn direction(mappings: Value) -> Value {
        json!({
            "types": {
                "packet": ["container", [
                    { "name": "name", "type": ["mapper", { "type": "varint", "mappings": mappings }] },
                    { "name": "params", "type": ["switch", { "compareTo": "name", "fields": {} }] }
                ]]
            }
        })
    }

    fn doc_with_play(to_client: Value, to_server: Value) -> Value {
        json!({
            "handshaking": { "toClient": { "types": {} }, "toServer": { "types": {} } },
            "play": { "toClient": to_client, "toServer": to_server }
        })
    }

    #[test]
    fn unpacks_and_normalizes() {
        let doc = doc_with_play(
            direction(json!({ "0x05": "spawn_entity", "0x06": "chat" })),
            direction(json!({ "0x03": "chat", "0x07": "use_item" })),
        );
        let play = unpack_phase(&doc, Phase::Play).unwrap();

        assert_eq!(play.clientbound["SpawnEntity"], "0x05");
        assert_eq!(play.clientbound["Chat"], "0x06");
        assert_eq!(play.serverbound["Chat"], "0x03");
        assert_eq!(play.serverbound["UseItem"], "0x07");
        assert_eq!(play.len(), 4);
    }

    #[test]
    fn empty_mappings_are_allowed() {
        let doc = doc_with_play(direction(json!({})), direction(json!({ "0x00": "ping" })));
        let play = unpack_phase(&doc, Phase::Play).unwrap();
        assert!(play.clientbound.is_empty());
        assert_eq!(play.serverbound.len(), 1);
    }

    #[test]
    fn missing_phase_names_the_phase() {
        let doc = doc_with_play(direction(json!({})), direction(json!({})));
        let err = unpack_phase(&doc, Phase::Login).unwrap_err().to_string();
        assert!(err.contains("'login' not found"), "{err}");
    }

    #[test]
    fn missing_direction_names_the_phase() {
        let doc = json!({ "status": { "toClient": direction(json!({})) } });
        let err = unpack_phase(&doc, Phase::Status).unwrap_err().to_string();
        assert!(err.contains("status"), "{err}");
        assert!(err.contains("'toServer' not found"), "{err}");
    }

    #[test]
    fn missing_mappings_key_is_a_schema_error() {
        let broken = json!({
            "types": {
                "packet": ["container", [
                    { "name": "name", "type": ["mapper", { "type": "varint" }] }
                ]]
            }
        });
        let doc = doc_with_play(broken, direction(json!({})));
        let err = unpack_phase(&doc, Phase::Play).unwrap_err();
        assert!(matches!(err, Error::Schema { ref path, .. } if path == "play.toClient"));
        assert!(err.to_string().contains("mappings"), "{err}");
    }

    #[test]
    fn wrong_shape_is_a_schema_error() {
        let doc = doc_with_play(json!({ "types": { "packet": "varint" } }), direction(json!({})));
        let err = unpack_phase(&doc, Phase::Play).unwrap_err();
        assert!(matches!(err, Error::Schema { ref path, .. } if path == "play.toClient"));
    }

    #[test]
    fn empty_container_is_a_schema_error() {
        let doc = doc_with_play(
            json!({ "types": { "packet": ["container", []] } }),
            direction(json!({})),
        );
        assert!(matches!(
            unpack_phase(&doc, Phase::Play),
            Err(Error::Schema { .. })
        ));
    }

    #[test]
    fn unexpected_tag_is_rejected() {
        let doc = doc_with_play(
            json!({
                "types": {
                    "packet": ["container", [
                        { "name": "name", "type": ["switch", { "mappings": {} }] }
                    ]]
                }
            }),
            direction(json!({})),
        );
        let err = unpack_phase(&doc, Phase::Play).unwrap_err().to_string();
        assert!(err.contains("expected 'mapper', found 'switch'"), "{err}");
    }

    #[test]
    fn non_integer_id_is_rejected() {
        let doc = doc_with_play(direction(json!({ "abc": "chat" })), direction(json!({})));
        let err = unpack_phase(&doc, Phase::Play).unwrap_err().to_string();
        assert!(err.contains("'abc'"), "{err}");
    }

    #[test]
    fn names_that_are_not_identifiers_are_rejected() {
        for raw in ["self", "2fa_request"] {
            let doc = doc_with_play(
                direction(json!({ "0x00": "chat", "0x01": raw })),
                direction(json!({})),
            );
            let err = unpack_phase(&doc, Phase::Play).unwrap_err();
            assert!(
                matches!(err, Error::Schema { ref path, ref reason } if path == "play.toClient" && reason.contains(raw)),
                "{err}"
            );
        }
    }

    #[test]
    fn names_normalizing_alike_are_rejected() {
        let doc = doc_with_play(
            direction(json!({ "0x01": "use_item", "0x02": "use-item" })),
            direction(json!({})),
        );
        let err = unpack_phase(&doc, Phase::Play).unwrap_err();
        assert!(matches!(err, Error::DuplicateName { ref name, .. } if name == "UseItem"));
    }

    #[test]
    fn root_must_be_an_object() {
        let err = unpack_phase(&json!([1, 2]), Phase::Play).unwrap_err().to_string();
        assert!(err.contains("expected an object, found a list"), "{err}");
    }

    #[test]
    fn invalid_json_is_a_decode_error() {
        assert!(matches!(
            parse_protocol("{ not json"),
            Err(Error::Decode(_))
        ));
    }
}
