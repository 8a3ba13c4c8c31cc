//! MySQL type to Laravel mappings.
//!
//! Each mapping site has its own fallback; an unknown type becomes a
//! `string` column, gets no cast and no type validation rule.

/// Blueprint column method for a lowercased base type.
pub fn migration_method(base: &str) -> &'static str {
    match base {
        // Integer types
        "int" | "integer" => "integer",
        "tinyint" => "tinyInteger",
        "smallint" => "smallInteger",
        "mediumint" => "mediumInteger",
        "bigint" => "bigInteger",

        // String types
        "varchar" | "string" => "string",
        "char" => "char",
        "text" | "tinytext" => "text",
        "mediumtext" => "mediumText",
        "longtext" => "longText",

        // Numeric
        "decimal" | "numeric" => "decimal",
        "float" | "real" => "float",
        "double" => "double",
        "boolean" | "bool" => "boolean",

        // Date/time
        "date" => "date",
        "datetime" => "dateTime",
        "timestamp" => "timestamp",
        "time" => "time",
        "year" => "year",

        "json" => "json",
        "enum" => "enum",
        "blob" | "binary" | "varbinary" | "longblob" | "mediumblob" | "tinyblob" => "binary",

        _ => "string",
    }
}

/// Eloquent `$casts` entry.
pub fn cast(base: &str) -> Option<&'static str> {
    match base {
        "datetime" | "timestamp" => Some("datetime"),
        "date" => Some("date"),
        "json" => Some("array"),
        "boolean" | "bool" => Some("boolean"),
        b if is_integral(b) => Some("integer"),
        b if is_fractional(b) => Some("float"),
        _ => None,
    }
}

/// Type-class validation rule.
pub fn validation_rule(base: &str) -> Option<&'static str> {
    match base {
        b if is_integral(b) => Some("integer"),
        b if is_fractional(b) => Some("numeric"),
        b if is_string(b) || is_text(b) => Some("string"),
        "date" | "datetime" | "timestamp" => Some("date"),
        "time" => Some("date_format:H:i:s"),
        "boolean" | "bool" => Some("boolean"),
        "json" => Some("array"),
        _ => None,
    }
}

pub fn is_integral(base: &str) -> bool {
    matches!(
        base,
        "int" | "integer" | "tinyint" | "smallint" | "mediumint" | "bigint"
    )
}

pub fn is_fractional(base: &str) -> bool {
    matches!(base, "decimal" | "numeric" | "float" | "real" | "double")
}

/// Length-bounded character types.
pub fn is_string(base: &str) -> bool {
    matches!(base, "varchar" | "string" | "char")
}

pub fn is_text(base: &str) -> bool {
    matches!(base, "text" | "tinytext" | "mediumtext" | "longtext")
}

pub fn is_boolean(base: &str) -> bool {
    matches!(base, "boolean" | "bool")
}

pub fn is_temporal(base: &str) -> bool {
    matches!(base, "date" | "datetime" | "timestamp" | "time" | "year")
}

/// Types whose default literal is emitted without quotes.
pub fn is_bare_literal(base: &str) -> bool {
    is_integral(base) || is_fractional(base) || is_boolean(base)
}

/// Types the migration mapping knows about; anything else falls back to `string`.
pub fn is_known(base: &str) -> bool {
    migration_method(base) != "string" || matches!(base, "varchar" | "string")
}
