//! Workbench XML document to [`Schema`].
//!
//! The document is a tree of `<value>` and `<link>` elements. Objects carry a
//! `struct-name` and an opaque `id`; their fields are child elements tagged
//! with a `key` attribute. Foreign keys and index columns point at tables and
//! columns by `id` only, so identifiers are mapped to names first.

use super::ParseError;
use super::correct::correction_for;
use crate::ast::{Column, Index, Reference, ReferentialAction, Relationship, Schema, Table};
use roxmltree::{Document, Node};
use std::collections::HashMap;
use tracing::{debug, warn};

const TABLE_STRUCT: &str = "db.mysql.Table";
const FOREIGN_KEY_STRUCT: &str = "db.mysql.ForeignKey";

/// Fallback when a column carries no type at all.
const DEFAULT_TYPE: &str = "varchar";

/// Parse a model document into a schema.
pub fn extract_document(xml: &str) -> Result<Schema, ParseError> {
    let doc = Document::parse(xml)?;
    let ids = IdentifierMap::build(&doc);

    let tables = doc
        .descendants()
        .filter(|n| is_struct(n, TABLE_STRUCT))
        .filter_map(|n| extract_table(n, &ids))
        .collect();

    let relationships = doc
        .descendants()
        .filter(|n| is_struct(n, FOREIGN_KEY_STRUCT))
        .map(|n| extract_relationship(n, &ids))
        .collect();

    Ok(Schema {
        tables,
        relationships,
    })
}

/// Identifier → name lookup for tables and columns.
struct IdentifierMap {
    tables: HashMap<String, String>,
    columns: HashMap<String, String>,
}

impl IdentifierMap {
    fn build(doc: &Document) -> Self {
        let mut tables = HashMap::new();
        let mut columns = HashMap::new();

        for table in doc.descendants().filter(|n| is_struct(n, TABLE_STRUCT)) {
            if let (Some(id), Some(name)) = (table.attribute("id"), keyed_text(table, "name")) {
                tables.insert(id.to_string(), name.to_string());
            }
            for col in list_items(table, "columns") {
                if let (Some(id), Some(name)) = (col.attribute("id"), keyed_text(col, "name")) {
                    columns.insert(id.to_string(), name.to_string());
                }
            }
        }

        Self { tables, columns }
    }

    fn table(&self, id: &str) -> Reference {
        resolve(&self.tables, id)
    }

    fn column(&self, id: &str) -> Reference {
        resolve(&self.columns, id)
    }
}

fn resolve(map: &HashMap<String, String>, id: &str) -> Reference {
    match map.get(id) {
        Some(name) => Reference::Resolved(name.clone()),
        None => Reference::Unresolved(id.to_string()),
    }
}

fn extract_table(node: Node, ids: &IdentifierMap) -> Option<Table> {
    let Some(name) = keyed_text(node, "name") else {
        warn!("extract: table element {:?} has no name, skipping", node.attribute("id"));
        return None;
    };

    let columns: Vec<Column> = list_items(node, "columns").filter_map(extract_column).collect();
    let mut table = Table::new(name, columns);
    table.comment = keyed_text(node, "comment").map(str::to_string);
    table.indexes = list_items(node, "indices").map(|n| extract_index(n, ids)).collect();

    debug!(
        "extract: table {} ({} columns, {} indexes)",
        table.name,
        table.columns.len(),
        table.indexes.len()
    );
    Some(table)
}

fn extract_column(node: Node) -> Option<Column> {
    let name = keyed_text(node, "name")?;

    let raw_type = keyed_text(node, "simpleType")
        .or_else(|| keyed_text(node, "userType"))
        .map(|t| t.rsplit('.').next().unwrap_or(t))
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TYPE);

    let auto_increment = keyed_flag(node, "autoIncrement");
    let typ = match correction_for(name, raw_type, auto_increment) {
        Some(rule) => {
            debug!(
                "extract: column {} corrected from {} to {} ({})",
                name, raw_type, rule.corrected, rule.reason
            );
            rule.corrected.to_string()
        }
        None => raw_type.to_string(),
    };

    Some(Column {
        name: name.to_string(),
        typ,
        length: keyed_text(node, "length").map(str::to_string),
        precision: keyed_text(node, "precision").map(str::to_string),
        scale: keyed_text(node, "scale").map(str::to_string),
        explicit_params: keyed_text(node, "datatypeExplicitParams").map(str::to_string),
        not_null: keyed_flag(node, "isNotNull"),
        auto_increment,
        default: keyed_text(node, "defaultValue").map(str::to_string),
        comment: keyed_text(node, "comment").map(str::to_string),
    })
}

fn extract_index(node: Node, ids: &IdentifierMap) -> Index {
    let columns: Vec<String> = keyed(node, "columns")
        .map(|list| {
            link_targets(list)
                .map(|id| match ids.column(id) {
                    Reference::Resolved(name) => name,
                    // Workbench sometimes stores a path; keep its last segment.
                    Reference::Unresolved(raw) => raw.rsplit('/').next().unwrap_or(&raw).to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    Index {
        name: keyed_text(node, "name").unwrap_or_default().to_string(),
        kind: keyed_text(node, "indexType").unwrap_or_default().to_string(),
        unique: keyed_flag(node, "unique"),
        columns,
    }
}

fn extract_relationship(node: Node, ids: &IdentifierMap) -> Relationship {
    let name = keyed_text(node, "name").unwrap_or_default().to_string();
    let source = ids.table(keyed_text(node, "owner").unwrap_or_default());
    let target = ids.table(keyed_text(node, "referencedTable").unwrap_or_default());

    let columns = |key: &str| -> Vec<Reference> {
        keyed(node, key)
            .map(|list| link_targets(list).map(|id| ids.column(id)).collect())
            .unwrap_or_default()
    };
    let source_columns = columns("columns");
    let target_columns = columns("referencedColumns");

    let rel = Relationship {
        name,
        source,
        target,
        source_columns,
        target_columns,
        on_delete: ReferentialAction::from_rule(keyed_text(node, "deleteRule").unwrap_or_default()),
        on_update: ReferentialAction::from_rule(keyed_text(node, "updateRule").unwrap_or_default()),
    };

    if rel.source_columns.len() != rel.target_columns.len() {
        warn!(
            "extract: foreign key {} pairs {} source columns with {} target columns",
            rel.name,
            rel.source_columns.len(),
            rel.target_columns.len()
        );
    }
    debug!(
        "extract: relation {}.{:?} -> {}.{:?}",
        rel.source.name(),
        rel.source_columns.iter().map(Reference::name).collect::<Vec<_>>(),
        rel.target.name(),
        rel.target_columns.iter().map(Reference::name).collect::<Vec<_>>()
    );
    rel
}

fn is_struct(node: &Node, struct_name: &str) -> bool {
    node.has_tag_name("value") && node.attribute("struct-name") == Some(struct_name)
}

/// Direct child field with the given `key`, whether a `<value>` or a `<link>`.
fn keyed<'a, 'input>(node: Node<'a, 'input>, key: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|c| c.is_element() && c.attribute("key") == Some(key))
}

/// Non-empty text of a keyed field.
fn keyed_text<'a>(node: Node<'a, '_>, key: &str) -> Option<&'a str> {
    keyed(node, key)
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn keyed_flag(node: Node, key: &str) -> bool {
    keyed_text(node, key) == Some("1")
}

/// Object elements inside a keyed list field.
fn list_items<'a, 'input>(node: Node<'a, 'input>, key: &str) -> impl Iterator<Item = Node<'a, 'input>> {
    keyed(node, key)
        .into_iter()
        .flat_map(|list| list.children().filter(|c| c.is_element() && c.has_tag_name("value")))
}

/// Text of every `<link>` below `node`.
fn link_targets<'a>(node: Node<'a, '_>) -> impl Iterator<Item = &'a str> {
    node.descendants()
        .filter(|n| n.is_element() && n.has_tag_name("link"))
        .filter_map(|n| n.text())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
