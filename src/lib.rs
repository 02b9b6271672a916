//! Generate Minecraft packet ID constants from the PrismarineJS protocol schema.
//!
//! `packet-id-gen` downloads `protocol.json` from
//! [minecraft-data](https://github.com/PrismarineJS/minecraft-data) and writes
//! a Rust source file with one `PktId` constant per packet, for every
//! direction of the login, play, and status phases.
//!
//! # Pipeline
//!
//! - [`schema`]: fetch the document and decode each phase/direction into typed structs
//! - [`naming`]: normalize packet names to UpperCamelCase
//! - [`resolve`]: suffix names both directions of a phase share, and reject
//!   any identifier that would still be emitted twice
//! - [`codegen`]: align, sort, and write the constants
//!
//! # Usage
//!
//! ```no_run
//! use std::path::Path;
//!
//! let doc = packet_id_gen::schema::load_protocol(Path::new("protocol.json"))?;
//! let stats = packet_id_gen::codegen::generate(&doc, Path::new("packet_ids.rs"))?;
//! eprintln!("Generated {} packet IDs", stats.total_packets());
//! # Ok::<(), packet_id_gen::error::Error>(())
//! ```

pub mod codegen;
pub mod error;
pub mod naming;
pub mod resolve;
pub mod schema;
