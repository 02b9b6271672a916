//! Disambiguation of packet names.
//!
//! Within a phase, a name used by both directions (`keep_alive`, `ping`) is
//! emitted twice, once per direction, with a `Clientbound` or `Serverbound`
//! suffix. Across phases nothing is renamed; a name reused by two phases is
//! reported by [`check_unique`] instead of silently generating a duplicate.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::error::{Error, Result};
use crate::schema::{Direction, PacketMapping, Phase, PhaseMappings, mapping_path};

/// Result of resolving one phase.
#[derive(Debug)]
pub struct Resolution {
    pub mappings: PhaseMappings,
    /// Original names that both directions shared, in sorted order.
    pub collisions: Vec<String>,
}

/// Rename every name that both directions of `phase` use.
///
/// Colliding names are rebuilt as `<name><suffix>` in each direction and keep
/// their original IDs. All other entries pass through unchanged.
pub fn resolve_collisions(phase: Phase, mappings: PhaseMappings) -> Result<Resolution> {
    let PhaseMappings {
        clientbound,
        serverbound,
    } = mappings;

    let collisions: BTreeSet<String> = clientbound
        .keys()
        .filter(|name| serverbound.contains_key(*name))
        .cloned()
        .collect();

    for name in &collisions {
        debug!(%phase, %name, "name used by both directions");
    }

    let qualify = |mapping: PacketMapping, direction: Direction| -> Result<PacketMapping> {
        let mut out = PacketMapping::new();
        for (name, id) in mapping {
            let name = if collisions.contains(&name) {
                format!("{name}{}", direction.suffix())
            } else {
                name
            };
            if let Some(first) = out.insert(name.clone(), id.clone()) {
                return Err(Error::DuplicateName {
                    path: mapping_path(phase, direction),
                    name,
                    first,
                    second: id,
                });
            }
        }
        Ok(out)
    };

    Ok(Resolution {
        mappings: PhaseMappings {
            clientbound: qualify(clientbound, Direction::Clientbound)?,
            serverbound: qualify(serverbound, Direction::Serverbound)?,
        },
        collisions: collisions.into_iter().collect(),
    })
}

/// Check that no identifier appears in more than one directional mapping.
///
/// `phases` is visited in order; the error names the first two mappings
/// that share an identifier.
pub fn check_unique<'a>(phases: impl IntoIterator<Item = (Phase, &'a PhaseMappings)>) -> Result<()> {
    let mut seen: BTreeMap<&str, String> = BTreeMap::new();
    for (phase, mappings) in phases {
        for direction in Direction::ALL {
            for name in mappings.get(direction).keys() {
                let here = mapping_path(phase, direction);
                if let Some(first) = seen.insert(name.as_str(), here.clone()) {
                    return Err(Error::NameCollision {
                        name: name.clone(),
                        first,
                        second: here,
                    });
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(entries: &[(&str, &str)]) -> PacketMapping {
        entries
            .iter()
            .map(|(name, id)| (name.to_string(), id.to_string()))
            .collect()
    }

    #[test]
    fn shared_name_gets_direction_suffixes() {
        let play = PhaseMappings {
            clientbound: mapping(&[("SpawnEntity", "5"), ("Chat", "6")]),
            serverbound: mapping(&[("Chat", "3"), ("UseItem", "7")]),
        };

        let resolved = resolve_collisions(Phase::Play, play).unwrap();

        assert_eq!(resolved.collisions, vec!["Chat".to_string()]);
        assert_eq!(
            resolved.mappings.clientbound,
            mapping(&[("SpawnEntity", "5"), ("ChatClientbound", "6")])
        );
        assert_eq!(
            resolved.mappings.serverbound,
            mapping(&[("ChatServerbound", "3"), ("UseItem", "7")])
        );
    }

    #[test]
    fn directions_share_no_names_after_resolution() {
        let status = PhaseMappings {
            clientbound: mapping(&[("ServerInfo", "0x00"), ("Ping", "0x01")]),
            serverbound: mapping(&[("PingStart", "0x00"), ("Ping", "0x01")]),
        };

        let resolved = resolve_collisions(Phase::Status, status).unwrap().mappings;

        assert!(
            resolved
                .clientbound
                .keys()
                .all(|name| !resolved.serverbound.contains_key(name))
        );
        assert_eq!(resolved.clientbound["PingClientbound"], "0x01");
        assert_eq!(resolved.serverbound["PingServerbound"], "0x01");
        assert_eq!(resolved.len(), 4);
    }

    #[test]
    fn disjoint_names_pass_through() {
        let login = PhaseMappings {
            clientbound: mapping(&[("Disconnect", "0x00")]),
            serverbound: mapping(&[("LoginStart", "0x00")]),
        };

        let resolved = resolve_collisions(Phase::Login, login.clone()).unwrap();

        assert!(resolved.collisions.is_empty());
        assert_eq!(resolved.mappings, login);
    }

    #[test]
    fn suffixed_name_clashing_with_existing_name_is_an_error() {
        let play = PhaseMappings {
            clientbound: mapping(&[("Chat", "1"), ("ChatClientbound", "2")]),
            serverbound: mapping(&[("Chat", "3")]),
        };

        let err = resolve_collisions(Phase::Play, play).unwrap_err();
        assert!(matches!(err, Error::DuplicateName { ref name, .. } if name == "ChatClientbound"));
        assert_eq!(
            err.to_string(),
            "schema error at play.toClient: packets 1 and 2 would both be emitted as 'ChatClientbound'"
        );
    }

    #[test]
    fn cross_phase_duplicate_is_reported() {
        let login = PhaseMappings {
            clientbound: mapping(&[("Disconnect", "0x00")]),
            serverbound: PacketMapping::new(),
        };
        let play = PhaseMappings {
            clientbound: PacketMapping::new(),
            serverbound: mapping(&[("Disconnect", "0x1b")]),
        };

        let err = check_unique([(Phase::Login, &login), (Phase::Play, &play)]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "identifier 'Disconnect' is emitted by both login.toClient and play.toServer"
        );
    }

    #[test]
    fn unique_names_pass() {
        let login = PhaseMappings {
            clientbound: mapping(&[("Disconnect", "0x00")]),
            serverbound: mapping(&[("LoginStart", "0x00")]),
        };
        let play = PhaseMappings {
            clientbound: mapping(&[("KickDisconnect", "0x19")]),
            serverbound: PacketMapping::new(),
        };
        assert!(check_unique([(Phase::Login, &login), (Phase::Play, &play)]).is_ok());
    }
}
