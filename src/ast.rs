//! Normalized schema extracted from a Workbench model.

use crate::naming::pluralize;

/// Column name that marks a table as soft-deletable.
pub const SOFT_DELETE_COLUMN: &str = "deleted_at";

/// Columns covered by the blanket `timestamps()` directive.
pub const TIMESTAMP_COLUMNS: [&str; 2] = ["created_at", "updated_at"];

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    pub tables: Vec<Table>,
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub comment: Option<String>,
    pub columns: Vec<Column>,
    pub indexes: Vec<Index>,
    pub has_soft_deletes: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    /// Declared type as read from the model, after correction.
    pub typ: String,
    pub length: Option<String>,
    pub precision: Option<String>,
    pub scale: Option<String>,
    /// Raw datatype parameters, e.g. `('a','b')` for enums.
    pub explicit_params: Option<String>,
    pub not_null: bool,
    pub auto_increment: bool,
    pub default: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    pub name: String,
    pub kind: String,
    pub unique: bool,
    pub columns: Vec<String>,
}

/// A name looked up through the model's identifier map.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reference {
    Resolved(String),
    /// The raw identifier, kept as display name when the lookup failed.
    Unresolved(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferentialAction {
    Cascade,
    SetNull,
    #[default]
    Restrict,
    NoAction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub name: String,
    pub source: Reference,
    pub target: Reference,
    pub source_columns: Vec<Reference>,
    pub target_columns: Vec<Reference>,
    pub on_delete: ReferentialAction,
    pub on_update: ReferentialAction,
}

impl Schema {
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Relationships whose source is `table`.
    pub fn outgoing<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.relationships
            .iter()
            .filter(move |r| r.source.name() == table)
    }

    /// Relationships whose target is `table`.
    pub fn incoming<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.relationships
            .iter()
            .filter(move |r| r.target.name() == table)
    }

    /// Whether a declared relationship lists `column` as a source column of `table`.
    pub fn is_declared_fk(&self, table: &str, column: &str) -> bool {
        self.outgoing(table)
            .any(|r| r.source_columns.iter().any(|c| c.name() == column))
    }

    /// Table a `*_id` column points at by name: `customer_id` refers to
    /// `customers`, or to `customer` when only that exists.
    pub fn convention_target(&self, column: &str) -> Option<&Table> {
        let stem = column.strip_suffix("_id").filter(|s| !s.is_empty())?;
        [pluralize(stem), stem.to_string()]
            .iter()
            .find_map(|name| self.table(name))
    }

    /// Every reference in the relationship list that failed to resolve.
    pub fn unresolved_references(&self) -> Vec<(&Relationship, &Reference)> {
        let mut out = Vec::new();
        for rel in &self.relationships {
            let refs = std::iter::once(&rel.source)
                .chain(std::iter::once(&rel.target))
                .chain(rel.source_columns.iter())
                .chain(rel.target_columns.iter());
            for r in refs {
                if !r.is_resolved() {
                    out.push((rel, r));
                }
            }
        }
        out
    }
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        let has_soft_deletes = columns.iter().any(|c| c.name == SOFT_DELETE_COLUMN);
        Self {
            name: name.into(),
            comment: None,
            columns,
            indexes: vec![],
            has_soft_deletes,
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

impl Column {
    pub fn new(name: impl Into<String>, typ: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            typ: typ.into(),
            length: None,
            precision: None,
            scale: None,
            explicit_params: None,
            not_null: false,
            auto_increment: false,
            default: None,
            comment: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn with_length(mut self, length: impl Into<String>) -> Self {
        self.length = Some(length.into());
        self
    }

    /// Lowercased type without any `(...)` suffix.
    pub fn base_type(&self) -> String {
        let lower = self.typ.to_lowercase();
        lower.split('(').next().unwrap_or(&lower).trim().to_string()
    }

    /// Declared length when it is a positive integer.
    pub fn declared_length(&self) -> Option<u32> {
        parse_positive(self.length.as_deref())
    }

    /// Values listed in the explicit parameters, e.g. `('a','b')` → `[a, b]`.
    pub fn enum_values(&self) -> Vec<String> {
        let Some(params) = self.explicit_params.as_deref() else {
            return vec![];
        };
        params
            .trim()
            .trim_start_matches('(')
            .trim_end_matches(')')
            .split(',')
            .map(|v| v.trim().trim_matches('\'').trim_matches('"').to_string())
            .filter(|v| !v.is_empty())
            .collect()
    }

    pub fn is_timestamp(&self) -> bool {
        TIMESTAMP_COLUMNS.contains(&self.name.as_str())
    }

    /// `id`, the timestamp pair and the soft-delete marker.
    pub fn is_framework_managed(&self) -> bool {
        self.name == "id" || self.is_timestamp() || self.name == SOFT_DELETE_COLUMN
    }
}

pub(crate) fn parse_positive(raw: Option<&str>) -> Option<u32> {
    raw.map(str::trim)
        .and_then(|s| s.parse::<u32>().ok())
        .filter(|n| *n > 0)
}

impl Reference {
    pub fn name(&self) -> &str {
        match self {
            Self::Resolved(s) | Self::Unresolved(s) => s,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

impl ReferentialAction {
    /// Parse a Workbench rule string; unknown or empty input yields `Restrict`.
    pub fn from_rule(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "CASCADE" => Self::Cascade,
            "SET NULL" => Self::SetNull,
            "NO ACTION" => Self::NoAction,
            _ => Self::Restrict,
        }
    }
}

impl Relationship {
    pub fn is_composite(&self) -> bool {
        self.source_columns.len() > 1 || self.target_columns.len() > 1
    }

    pub fn is_self_referencing(&self) -> bool {
        self.source.name() == self.target.name()
    }

    /// Source/target column name pairs; a missing target column defaults to `id`.
    pub fn column_pairs(&self) -> Vec<(&str, &str)> {
        self.source_columns
            .iter()
            .enumerate()
            .map(|(i, src)| {
                let target = self.target_columns.get(i).map(|r| r.name()).unwrap_or("id");
                (src.name(), target)
            })
            .collect()
    }
}
