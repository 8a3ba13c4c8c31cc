//! Eloquent model classes.

use super::context::{Context, Relation, RelationKind, model_name};
use super::php::php_string;
use super::types::cast;
use crate::ast::Table;

pub fn render(table: &Table, ctx: &Context) -> String {
    let model = model_name(&table.name);

    let fillable = fillable(table);
    let casts: Vec<(String, &'static str)> = table
        .columns
        .iter()
        .filter(|c| c.name != "id")
        .filter_map(|c| cast(&c.base_type()).map(|k| (c.name.clone(), k)))
        .collect();

    let mut uses = vec![
        "use Illuminate\\Database\\Eloquent\\Factories\\HasFactory;",
        "use Illuminate\\Database\\Eloquent\\Model;",
    ];
    let mut traits = vec!["use HasFactory;"];
    if table.has_soft_deletes {
        uses.push("use Illuminate\\Database\\Eloquent\\SoftDeletes;");
        traits.push("use SoftDeletes;");
    }

    let mut out = String::new();
    out.push_str("<?php\n\nnamespace App\\Models;\n\n");
    for u in &uses {
        out.push_str(&format!("{u}\n"));
    }
    out.push_str(&format!("\nclass {model} extends Model\n{{\n"));
    for t in &traits {
        out.push_str(&format!("    {t}\n"));
    }
    out.push_str(&format!("\n    protected $table = {};\n", php_string(&table.name)));

    out.push_str("\n    protected $fillable = [\n");
    for name in &fillable {
        out.push_str(&format!("        {},\n", php_string(name)));
    }
    out.push_str("    ];\n");

    out.push_str("\n    protected $casts = [\n");
    for (name, kind) in &casts {
        out.push_str(&format!("        {} => '{kind}',\n", php_string(name)));
    }
    out.push_str("    ];\n");

    for relation in ctx.relations(&table.name) {
        out.push_str(&accessor(&relation));
    }
    out.push_str("}\n");
    out
}

/// Every column except `id`, the timestamp pair and `deleted_at`.
pub fn fillable(table: &Table) -> Vec<&str> {
    table
        .columns
        .iter()
        .filter(|c| !c.is_framework_managed())
        .map(|c| c.name.as_str())
        .collect()
}

fn accessor(relation: &Relation) -> String {
    let (kind, ret) = match relation.kind {
        RelationKind::BelongsTo => ("belongsTo", "BelongsTo"),
        RelationKind::HasMany => ("hasMany", "HasMany"),
    };
    let mut args = format!("{}::class, '{}'", relation.related_model, relation.foreign_column);
    if let Some(owner) = &relation.owner_key {
        args.push_str(&format!(", '{owner}'"));
    }
    format!(
        "\n    public function {}(): \\Illuminate\\Database\\Eloquent\\Relations\\{ret}\n    {{\n        return $this->{kind}({args});\n    }}\n",
        relation.method
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Column, Reference, ReferentialAction, Relationship, Schema};
    use crate::config::GeneratorConfig;

    fn schema() -> Schema {
        Schema {
            tables: vec![
                Table::new("users", vec![Column::new("id", "BIGINT").not_null()]),
                Table::new(
                    "posts",
                    vec![
                        Column::new("id", "BIGINT").not_null(),
                        Column::new("user_id", "BIGINT").not_null(),
                        Column::new("title", "VARCHAR").with_length("100"),
                        Column::new("metadata", "JSON"),
                        Column::new("published_at", "DATETIME"),
                        Column::new("created_at", "TIMESTAMP"),
                        Column::new("updated_at", "TIMESTAMP"),
                        Column::new("deleted_at", "TIMESTAMP"),
                    ],
                ),
            ],
            relationships: vec![Relationship {
                name: "fk_posts_users".into(),
                source: Reference::Resolved("posts".into()),
                target: Reference::Resolved("users".into()),
                source_columns: vec![Reference::Resolved("user_id".into())],
                target_columns: vec![Reference::Resolved("id".into())],
                on_delete: ReferentialAction::Cascade,
                on_update: ReferentialAction::Cascade,
            }],
        }
    }

    #[test]
    fn test_fillable() {
        let schema = schema();
        assert_eq!(
            fillable(schema.table("posts").unwrap()),
            vec!["user_id", "title", "metadata", "published_at"]
        );
    }

    #[test]
    fn test_post_model() {
        let schema = schema();
        let config = GeneratorConfig::default();
        let ctx = Context::new(&schema, &config);
        let out = render(schema.table("posts").unwrap(), &ctx);

        assert!(out.contains("class Post extends Model"));
        assert!(out.contains("    use SoftDeletes;\n"));
        assert!(out.contains("protected $table = 'posts';"));
        assert!(out.contains("        'title',\n"));
        assert!(!out.contains("        'created_at',\n"));
        assert!(out.contains("'metadata' => 'array',"));
        assert!(out.contains("'published_at' => 'datetime',"));
        assert!(out.contains("'user_id' => 'integer',"));
        assert!(out.contains("public function user(): \\Illuminate\\Database\\Eloquent\\Relations\\BelongsTo"));
        assert!(out.contains("return $this->belongsTo(User::class, 'user_id');"));
    }

    #[test]
    fn test_has_many_side() {
        let schema = schema();
        let config = GeneratorConfig::default();
        let ctx = Context::new(&schema, &config);
        let out = render(schema.table("users").unwrap(), &ctx);
        assert!(out.contains("return $this->hasMany(Post::class, 'user_id');"));
        assert!(!out.contains("SoftDeletes"));
    }

    #[test]
    fn test_owner_key() {
        let relation = Relation {
            kind: RelationKind::BelongsTo,
            method: "country".into(),
            related_model: "Country".into(),
            foreign_column: "country_code".into(),
            owner_key: Some("code".into()),
        };
        assert!(accessor(&relation).contains("belongsTo(Country::class, 'country_code', 'code')"));
    }
}
