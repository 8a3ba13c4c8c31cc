//! Non-fatal findings about a schema.

use crate::ast::{Reference, Schema};
use crate::emit::is_conventional_fk;
use crate::emit::migration::{has_invalid_length, has_known_type};
use crate::order::BackEdge;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// String column whose length is missing or unusable; 255 is used.
    InvalidLength {
        table: String,
        column: String,
        raw: Option<String>,
    },
    /// Type the migration mapping does not know; `string` is used.
    UnknownType {
        table: String,
        column: String,
        typ: String,
    },
    /// `*_id` column not covered by a declared relationship.
    ImplicitForeignKey { table: String, column: String },
    UnresolvedReference {
        relationship: String,
        identifier: String,
    },
    CompositeForeignKey {
        relationship: String,
        table: String,
        columns: Vec<String>,
    },
    Cycle(BackEdge),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLength { table, column, raw } => write!(
                f,
                "{table}.{column}: invalid length {}, using 255",
                raw.as_deref().map_or("(none)".to_string(), |r| format!("'{r}'"))
            ),
            Self::UnknownType { table, column, typ } => {
                write!(f, "{table}.{column}: unknown type '{typ}', using string")
            }
            Self::ImplicitForeignKey { table, column } => {
                write!(f, "{table}.{column}: foreign key by name only, no relationship declared")
            }
            Self::UnresolvedReference {
                relationship,
                identifier,
            } => write!(f, "{relationship}: unresolved reference {identifier}"),
            Self::CompositeForeignKey {
                relationship,
                table,
                columns,
            } => write!(
                f,
                "{relationship}: composite foreign key on {table} ({}), no relation accessors",
                columns.join(", ")
            ),
            Self::Cycle(edge) => write!(f, "cycle: {} -> {}", edge.from, edge.to),
        }
    }
}

/// Everything worth reporting about `schema`, table by table, then
/// relationships, then `cycles`.
pub fn diagnose(schema: &Schema, cycles: &[BackEdge]) -> Vec<Diagnostic> {
    let mut out = Vec::new();

    for table in &schema.tables {
        for col in &table.columns {
            if has_invalid_length(col) {
                out.push(Diagnostic::InvalidLength {
                    table: table.name.clone(),
                    column: col.name.clone(),
                    raw: col.length.clone(),
                });
            }
            if !has_known_type(col) {
                out.push(Diagnostic::UnknownType {
                    table: table.name.clone(),
                    column: col.name.clone(),
                    typ: col.typ.clone(),
                });
            }
            if is_conventional_fk(&col.name) && !schema.is_declared_fk(&table.name, &col.name) {
                out.push(Diagnostic::ImplicitForeignKey {
                    table: table.name.clone(),
                    column: col.name.clone(),
                });
            }
        }
    }

    for rel in &schema.relationships {
        if rel.is_composite() {
            out.push(Diagnostic::CompositeForeignKey {
                relationship: rel.name.clone(),
                table: rel.source.name().to_string(),
                columns: rel.source_columns.iter().map(|c| c.name().to_string()).collect(),
            });
        }
    }

    for (rel, reference) in schema.unresolved_references() {
        if let Reference::Unresolved(identifier) = reference {
            out.push(Diagnostic::UnresolvedReference {
                relationship: rel.name.clone(),
                identifier: identifier.clone(),
            });
        }
    }

    out.extend(cycles.iter().cloned().map(Diagnostic::Cycle));
    out
}
