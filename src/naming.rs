//! Case-style conversion and English/Spanish inflection.

use regex::Regex;
use std::sync::LazyLock;

static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-_\s]+").unwrap());
static WORD_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(.)([A-Z][a-z]+)").unwrap());
static LOWER_UPPER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").unwrap());

/// (singular, plural) pairs checked before any suffix rule.
const IRREGULARS: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("tooth", "teeth"),
    ("foot", "feet"),
    ("mouse", "mice"),
    ("goose", "geese"),
    // Spanish
    ("rol", "roles"),
    ("estatus", "estatus"),
    ("cliente", "clientes"),
    ("medico", "medicos"),
    ("servicio", "servicios"),
    ("horario", "horarios"),
];

/// Endings that are singular despite the trailing `s`.
const SINGULAR_ENDINGS: [&str; 2] = ["status", "alias"];

/// `user_posts`, `user-posts`, `user posts` → `UserPosts`.
pub fn pascal(s: &str) -> String {
    SEPARATORS
        .split(s)
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect()
}

pub fn camel(s: &str) -> String {
    let p = pascal(s);
    let mut chars = p.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `UserPosts`, `blogPosts`, `user-posts` → `user_posts`.
pub fn snake(s: &str) -> String {
    let s = WORD_BOUNDARY.replace_all(s, "${1}_${2}");
    let s = LOWER_UPPER.replace_all(&s, "${1}_${2}");
    s.replace('-', "_").to_lowercase()
}

pub fn kebab(s: &str) -> String {
    snake(s).replace('_', "-")
}

pub fn pluralize(word: &str) -> String {
    if let Some(plural) = lookup_irregular(word, |(singular, plural)| (singular, plural)) {
        return plural;
    }

    let lower = word.to_lowercase();
    let len = lower.chars().count();

    if lower.ends_with('y') && len > 1 && !ends_with_vowel(&lower[..lower.len() - 1]) {
        return format!("{}ies", &word[..word.len() - 1]);
    }
    if ["s", "x", "z", "ch", "sh"].iter().any(|s| lower.ends_with(s)) {
        return format!("{word}es");
    }
    if lower.ends_with("fe") && len > 2 {
        return format!("{}ves", &word[..word.len() - 2]);
    }
    if lower.ends_with('f') && len > 1 {
        return format!("{}ves", &word[..word.len() - 1]);
    }
    format!("{word}s")
}

pub fn singularize(word: &str) -> String {
    if let Some(singular) = lookup_irregular(word, |(singular, plural)| (plural, singular)) {
        return singular;
    }

    let lower = word.to_lowercase();
    let len = lower.chars().count();

    if lower.ends_with("ies") && len > 3 {
        return format!("{}y", &word[..word.len() - 3]);
    }
    if lower.ends_with("ves") && len > 3 {
        return format!("{}f", &word[..word.len() - 3]);
    }
    if ["ses", "xes", "zes", "ches", "shes"]
        .iter()
        .any(|s| lower.ends_with(s) && len > s.len())
    {
        return word[..word.len() - 2].to_string();
    }
    if lower.ends_with("ss") || SINGULAR_ENDINGS.iter().any(|e| lower.ends_with(e)) {
        return word.to_string();
    }
    if lower.ends_with('s') && len > 1 {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

/// Looks `word` up in the irregular table, `orient` picks (from, to).
/// The first letter's case is carried over to the result.
fn lookup_irregular(
    word: &str,
    orient: impl Fn((&'static str, &'static str)) -> (&'static str, &'static str),
) -> Option<String> {
    let lower = word.to_lowercase();
    let (_, to) = IRREGULARS
        .iter()
        .map(|pair| orient(*pair))
        .find(|(from, _)| *from == lower)?;
    if word.chars().next().is_some_and(char::is_uppercase) {
        Some(capitalize(to))
    } else {
        Some(to.to_string())
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn ends_with_vowel(s: &str) -> bool {
    s.ends_with(['a', 'e', 'i', 'o', 'u'])
}
