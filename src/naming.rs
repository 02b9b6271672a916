//! Identifier normalization and packet ID literal parsing.
//!
//! PrismarineJS names packets in snake_case (`spawn_entity_living`) and
//! writes IDs as hex literals (`"0x02"`). Generated constants use
//! UpperCamelCase names and keep the ID text exactly as the schema wrote it.

use heck::ToUpperCamelCase;

/// Convert a raw packet name to the identifier used for its constant.
///
/// - `"spawn_entity"` → `"SpawnEntity"`
/// - `"login_plugin_request"` → `"LoginPluginRequest"`
/// - `"ping"` → `"Ping"`
pub fn normalize_name(raw: &str) -> String {
    raw.to_upper_camel_case()
}

/// Words that cannot name a constant, including keywords reserved for
/// future editions.
const RESERVED: &[&str] = &[
    "Self", "_", "abstract", "as", "async", "await", "become", "box", "break", "const",
    "continue", "crate", "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for",
    "gen", "if", "impl", "in", "let", "loop", "macro", "match", "mod", "move", "mut",
    "override", "priv", "pub", "ref", "return", "self", "static", "struct", "super", "trait",
    "true", "try", "type", "typeof", "unsafe", "unsized", "use", "virtual", "where", "while",
    "yield",
];

/// Whether `name` can be emitted verbatim as a constant name.
///
/// ASCII only: a letter or `_` followed by letters, digits, or `_`, and not
/// a keyword.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !RESERVED.contains(&name)
}

/// Parse a packet ID literal as it appears in the schema.
///
/// Accepts decimal (`"5"`) and `0x`-prefixed hex (`"0x1a"`). Returns `None`
/// for anything that is not a valid Rust integer literal fitting in `i32`.
pub fn parse_packet_id(text: &str) -> Option<i32> {
    let digits = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"));
    match digits {
        Some(hex) if !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
            i32::from_str_radix(hex, 16).ok()
        }
        Some(_) => None,
        None if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) => text.parse().ok(),
        None => None,
    }
}
