//! Per-run lookup tables shared by the emitters.

use crate::ast::{ReferentialAction, Relationship, Schema, Table};
use crate::config::GeneratorConfig;
use crate::naming::{camel, pascal, pluralize, singularize};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// A column emitted as a `foreignId(...)` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    pub column: String,
    /// Referenced (table, column); `None` for a `*_id` column whose table
    /// could not be guessed.
    pub target: Option<(String, String)>,
    /// Delete and update rules, only known for declared relationships.
    pub rules: Option<(ReferentialAction, ReferentialAction)>,
    pub nullable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    BelongsTo,
    HasMany,
}

/// An Eloquent relation accessor.
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub kind: RelationKind,
    pub method: String,
    pub related_model: String,
    pub foreign_column: String,
    /// Key on the owning side when it is not `id`.
    pub owner_key: Option<String>,
}

pub struct Context<'a> {
    pub schema: &'a Schema,
    pub config: &'a GeneratorConfig,
    foreign_keys: HashMap<&'a str, Vec<ForeignKey>>,
    composite_members: HashSet<(&'a str, &'a str)>,
}

impl<'a> Context<'a> {
    pub fn new(schema: &'a Schema, config: &'a GeneratorConfig) -> Self {
        let mut composite_members = HashSet::new();
        for rel in schema.relationships.iter().filter(|r| r.is_composite()) {
            warn!(
                "emit: composite foreign key {} on {}, no relation accessors generated",
                rel.name,
                rel.source.name()
            );
            for col in &rel.source_columns {
                composite_members.insert((rel.source.name(), col.name()));
            }
        }

        let mut ctx = Self {
            schema,
            config,
            foreign_keys: HashMap::new(),
            composite_members,
        };
        for table in &schema.tables {
            let fks = ctx.collect_foreign_keys(table);
            ctx.foreign_keys.insert(table.name.as_str(), fks);
        }
        ctx
    }

    /// Declared single-column relationships first (model order), then
    /// `*_id` columns by naming convention (column order).
    fn collect_foreign_keys(&self, table: &'a Table) -> Vec<ForeignKey> {
        let mut fks: Vec<ForeignKey> = Vec::new();

        for rel in self.schema.outgoing(&table.name).filter(|r| !r.is_composite()) {
            let Some((column, target_column)) = rel.column_pairs().first().copied() else {
                continue;
            };
            if fks.iter().any(|fk| fk.column == column) {
                continue;
            }
            fks.push(ForeignKey {
                column: column.to_string(),
                target: Some((rel.target.name().to_string(), target_column.to_string())),
                rules: Some((rel.on_delete, rel.on_update)),
                nullable: table.column(column).is_some_and(|c| !c.not_null),
            });
        }

        for col in &table.columns {
            if !is_conventional_fk(&col.name)
                || fks.iter().any(|fk| fk.column == col.name)
                || self.composite_members.contains(&(table.name.as_str(), col.name.as_str()))
            {
                continue;
            }
            let target = self.guess_target(&col.name);
            if target.is_none() {
                warn!(
                    "emit: {}.{} looks like a foreign key but no matching table exists",
                    table.name, col.name
                );
            }
            fks.push(ForeignKey {
                column: col.name.clone(),
                target: target.map(|t| (t, "id".to_string())),
                rules: None,
                nullable: !col.not_null,
            });
        }

        fks
    }

    fn guess_target(&self, column: &str) -> Option<String> {
        self.schema.convention_target(column).map(|t| t.name.clone())
    }

    pub fn foreign_keys(&self, table: &str) -> &[ForeignKey] {
        self.foreign_keys.get(table).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn foreign_key(&self, table: &str, column: &str) -> Option<&ForeignKey> {
        self.foreign_keys(table).iter().find(|fk| fk.column == column)
    }

    pub fn composites<'s>(&'s self, table: &'s str) -> impl Iterator<Item = &'s Relationship> + 's {
        self.schema.outgoing(table).filter(|r| r.is_composite())
    }

    /// belongs-to accessors for outgoing relationships, then has-many
    /// accessors for incoming ones. Method names are unique per model.
    pub fn relations(&self, table: &str) -> Vec<Relation> {
        let mut relations: Vec<Relation> = Vec::new();
        let mut taken: HashSet<String> = HashSet::new();

        for rel in self.schema.outgoing(table).filter(|r| !r.is_composite()) {
            let Some((column, target_column)) = rel.column_pairs().first().copied() else {
                continue;
            };
            let target = singularize(rel.target.name());
            let method = unique_method(&mut taken, camel(&target), || camel(column_stem(column)));
            relations.push(Relation {
                kind: RelationKind::BelongsTo,
                method,
                related_model: model_name(rel.target.name()),
                foreign_column: column.to_string(),
                owner_key: (target_column != "id").then(|| target_column.to_string()),
            });
        }

        for rel in self.schema.incoming(table).filter(|r| !r.is_composite()) {
            let Some((column, target_column)) = rel.column_pairs().first().copied() else {
                continue;
            };
            let plural = pluralize(&singularize(rel.source.name()));
            let method = unique_method(&mut taken, camel(&plural), || {
                camel(&format!("{}_{}", column_stem(column), plural))
            });
            relations.push(Relation {
                kind: RelationKind::HasMany,
                method,
                related_model: model_name(rel.source.name()),
                foreign_column: column.to_string(),
                owner_key: (target_column != "id").then(|| target_column.to_string()),
            });
        }

        relations
    }

    /// Accessor names to eager-load: every belongs-to relation.
    pub fn eager_loads(&self, table: &str) -> Vec<String> {
        self.relations(table)
            .into_iter()
            .filter(|r| r.kind == RelationKind::BelongsTo)
            .map(|r| r.method)
            .collect()
    }
}

/// `Post` for `posts`.
pub fn model_name(table: &str) -> String {
    pascal(&singularize(table))
}

pub fn is_conventional_fk(column: &str) -> bool {
    column != "id" && column.ends_with("_id")
}

fn column_stem(column: &str) -> &str {
    column.strip_suffix("_id").unwrap_or(column)
}

fn unique_method(
    taken: &mut HashSet<String>,
    preferred: String,
    fallback: impl FnOnce() -> String,
) -> String {
    let mut method = preferred;
    if taken.contains(&method) {
        method = fallback();
    }
    let base = method.clone();
    let mut n = 2;
    while taken.contains(&method) {
        method = format!("{base}{n}");
        n += 1;
    }
    taken.insert(method.clone());
    method
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Column, Reference};

    fn rel(source: &str, column: &str, target: &str) -> Relationship {
        Relationship {
            name: format!("fk_{source}_{column}"),
            source: Reference::Resolved(source.into()),
            target: Reference::Resolved(target.into()),
            source_columns: vec![Reference::Resolved(column.into())],
            target_columns: vec![Reference::Resolved("id".into())],
            on_delete: ReferentialAction::Cascade,
            on_update: ReferentialAction::Restrict,
        }
    }

    fn schema() -> Schema {
        Schema {
            tables: vec![
                Table::new("users", vec![Column::new("id", "BIGINT")]),
                Table::new("categories", vec![Column::new("id", "BIGINT")]),
                Table::new(
                    "posts",
                    vec![
                        Column::new("id", "BIGINT"),
                        Column::new("author_id", "BIGINT").not_null(),
                        Column::new("editor_id", "BIGINT"),
                        Column::new("category_id", "BIGINT"),
                        Column::new("legacy_id", "BIGINT"),
                    ],
                ),
            ],
            relationships: vec![rel("posts", "author_id", "users"), rel("posts", "editor_id", "users")],
        }
    }

    #[test]
    fn test_foreign_keys() {
        let schema = schema();
        let config = GeneratorConfig::default();
        let ctx = Context::new(&schema, &config);
        let fks = ctx.foreign_keys("posts");
        let columns: Vec<&str> = fks.iter().map(|f| f.column.as_str()).collect();
        assert_eq!(columns, vec!["author_id", "editor_id", "category_id", "legacy_id"]);

        let author = ctx.foreign_key("posts", "author_id").unwrap();
        assert_eq!(author.target, Some(("users".into(), "id".into())));
        assert!(!author.nullable);
        assert!(ctx.foreign_key("posts", "editor_id").unwrap().nullable);

        let category = ctx.foreign_key("posts", "category_id").unwrap();
        assert_eq!(category.target, Some(("categories".into(), "id".into())));
        assert_eq!(category.rules, None);

        assert_eq!(ctx.foreign_key("posts", "legacy_id").unwrap().target, None);
        assert!(ctx.foreign_key("posts", "id").is_none());
    }

    #[test]
    fn test_relation_names_are_unique() {
        let schema = schema();
        let config = GeneratorConfig::default();
        let ctx = Context::new(&schema, &config);

        let posts: Vec<String> = ctx.relations("posts").into_iter().map(|r| r.method).collect();
        assert_eq!(posts, vec!["user", "editor"]);

        let users: Vec<String> = ctx.relations("users").into_iter().map(|r| r.method).collect();
        assert_eq!(users, vec!["posts", "editorPosts"]);
        assert_eq!(ctx.eager_loads("posts"), vec!["user", "editor"]);
    }

    #[test]
    fn test_composite_members_are_plain_columns() {
        let mut schema = schema();
        schema.tables.push(Table::new(
            "grades",
            vec![Column::new("student_id", "BIGINT"), Column::new("course_id", "BIGINT")],
        ));
        schema.relationships.push(Relationship {
            name: "fk_grades_enrollments".into(),
            source: Reference::Resolved("grades".into()),
            target: Reference::Resolved("enrollments".into()),
            source_columns: vec![
                Reference::Resolved("student_id".into()),
                Reference::Resolved("course_id".into()),
            ],
            target_columns: vec![
                Reference::Resolved("student_id".into()),
                Reference::Resolved("course_id".into()),
            ],
            on_delete: ReferentialAction::Cascade,
            on_update: ReferentialAction::Cascade,
        });
        let config = GeneratorConfig::default();
        let ctx = Context::new(&schema, &config);
        assert!(ctx.foreign_keys("grades").is_empty());
        assert_eq!(ctx.composites("grades").count(), 1);
        assert!(ctx.relations("grades").is_empty());
    }

    #[test]
    fn test_model_name() {
        assert_eq!(model_name("posts"), "Post");
        assert_eq!(model_name("order_items"), "OrderItem");
        assert_eq!(model_name("categories"), "Category");
        assert_eq!(model_name("roles"), "Rol");
        assert_eq!(model_name("status"), "Status");
        assert_eq!(model_name("order_status"), "OrderStatus");
    }
}
