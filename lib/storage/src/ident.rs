//! Identifier sanitization and column typing
//!
//! Every generated table, column, and collection name passes through
//! [`sanitize_ident`] so keypaths and entity names cannot smuggle SQL
//! syntax or filesystem separators into DDL or paths.

use jsonshard_core::LeafType;

/// Make a string safe as a SQL identifier or collection file stem.
///
/// Characters outside `[A-Za-z0-9_]` become `_`; an empty or digit-leading
/// result is prefixed with `t_`; the whole thing is lowercased.
pub fn sanitize_ident(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.is_empty() || out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out = format!("t_{out}");
    }
    out.to_ascii_lowercase()
}

/// SQLite column type for a leaf type.
pub fn column_type(leaf: LeafType) -> &'static str {
    match leaf {
        LeafType::Number => "REAL",
        LeafType::String => "TEXT",
        LeafType::Bool => "INTEGER",
        LeafType::Null | LeafType::Unknown => "TEXT",
        // containers never become scalar columns; TEXT is the safe fallback
        LeafType::Array | LeafType::Object => "TEXT",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replaces_punctuation() {
        assert_eq!(sanitize_ident("items[].price"), "items___price");
        assert_eq!(sanitize_ident("user.name"), "user_name");
    }

    #[test]
    fn test_sanitize_lowercases() {
        assert_eq!(sanitize_ident("SensorReading"), "sensorreading");
    }

    #[test]
    fn test_sanitize_digit_prefix() {
        assert_eq!(sanitize_ident("1st_table"), "t_1st_table");
    }

    #[test]
    fn test_sanitize_empty() {
        assert_eq!(sanitize_ident(""), "t_");
    }

    #[test]
    fn test_column_type_mapping() {
        assert_eq!(column_type(LeafType::Number), "REAL");
        assert_eq!(column_type(LeafType::String), "TEXT");
        assert_eq!(column_type(LeafType::Bool), "INTEGER");
        assert_eq!(column_type(LeafType::Null), "TEXT");
        assert_eq!(column_type(LeafType::Unknown), "TEXT");
    }
}
