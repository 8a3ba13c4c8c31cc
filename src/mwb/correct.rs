//! Column type correction from name heuristics.
//!
//! Workbench defaults untyped columns to `VARCHAR`. When the raw type is that
//! generic string type, the rules below are evaluated top-down and the first
//! matching rule supplies the corrected type.

/// Raw types treated as "no real type chosen".
const GENERIC_STRING_TYPES: [&str; 2] = ["varchar", "string"];

const DATE_KEYWORDS: [&str; 2] = ["fecha", "date"];
const DATETIME_KEYWORDS: [&str; 4] = ["hora", "time", "creacion", "reservacion"];
const TIME_KEYWORDS: [&str; 2] = ["hora", "time"];
const AGE_NAMES: [&str; 3] = ["edad", "age", "years"];
const PRICE_KEYWORDS: [&str; 4] = ["precio", "costo", "price", "cost"];

/// What a rule sees of a column.
#[derive(Debug, Clone, Copy)]
pub struct ColumnTraits<'a> {
    /// Lowercased column name.
    pub name: &'a str,
    pub auto_increment: bool,
}

pub struct CorrectionRule {
    pub reason: &'static str,
    pub matches: fn(&ColumnTraits) -> bool,
    pub corrected: &'static str,
}

pub const RULES: &[CorrectionRule] = &[
    CorrectionRule {
        reason: "auto_increment",
        matches: |c| c.auto_increment,
        corrected: "BIGINT",
    },
    CorrectionRule {
        reason: "looks like an id",
        matches: |c| c.name == "id" || c.name.ends_with("_id"),
        corrected: "BIGINT",
    },
    CorrectionRule {
        reason: "date with time",
        matches: |c| contains_any(c.name, &DATE_KEYWORDS) && contains_any(c.name, &DATETIME_KEYWORDS),
        corrected: "DATETIME",
    },
    CorrectionRule {
        reason: "date",
        matches: |c| contains_any(c.name, &DATE_KEYWORDS),
        corrected: "DATE",
    },
    CorrectionRule {
        reason: "time",
        matches: |c| contains_any(c.name, &TIME_KEYWORDS),
        corrected: "TIME",
    },
    CorrectionRule {
        reason: "age",
        matches: |c| AGE_NAMES.contains(&c.name),
        corrected: "INT",
    },
    CorrectionRule {
        reason: "price",
        matches: |c| contains_any(c.name, &PRICE_KEYWORDS),
        corrected: "DECIMAL",
    },
];

/// Returns the matching rule when `raw_type` should be replaced.
pub fn correction_for(name: &str, raw_type: &str, auto_increment: bool) -> Option<&'static CorrectionRule> {
    let raw = raw_type.trim().to_lowercase();
    let base = raw.split('(').next().unwrap_or(&raw).trim();
    if !GENERIC_STRING_TYPES.contains(&base) {
        return None;
    }

    let lower = name.to_lowercase();
    let traits = ColumnTraits {
        name: &lower,
        auto_increment,
    };
    RULES.iter().find(|rule| (rule.matches)(&traits))
}

/// The corrected type, or `raw_type` unchanged.
pub fn correct_type(name: &str, raw_type: &str, auto_increment: bool) -> String {
    match correction_for(name, raw_type, auto_increment) {
        Some(rule) => rule.corrected.to_string(),
        None => raw_type.to_string(),
    }
}

fn contains_any(name: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| name.contains(k))
}
