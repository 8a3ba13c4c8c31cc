//! `Schema::create` migrations.

use super::context::{Context, ForeignKey};
use super::php::{php_list, php_string};
use super::types::{self, is_bare_literal, is_integral, is_string, is_temporal, migration_method};
use crate::ast::{Column, ReferentialAction, Relationship, Table, parse_positive};

const DEFAULT_STRING_LENGTH: u32 = 255;
const DEFAULT_PRECISION: u32 = 8;
const DEFAULT_SCALE: u32 = 2;

const INDENT: &str = "            ";

pub fn render(table: &Table, ctx: &Context) -> String {
    let mut lines: Vec<String> = table
        .columns
        .iter()
        .filter_map(|col| column_line(table, col, ctx))
        .collect();

    for fk in ctx.foreign_keys(&table.name) {
        lines.push(foreign_key_line(fk));
    }
    for rel in ctx.composites(&table.name) {
        lines.push(composite_line(rel));
    }
    lines.extend(index_lines(table));

    // Every table gets the timestamp pair; soft deletes only when modeled.
    let mut special = vec!["$table->timestamps();".to_string()];
    if table.has_soft_deletes {
        special.push("$table->softDeletes();".to_string());
    }
    if let Some(comment) = &table.comment {
        special.push(format!("$table->comment({});", php_string(comment)));
    }

    let mut body = String::new();
    for line in &lines {
        body.push_str(&format!("{INDENT}{line}\n"));
    }
    if !lines.is_empty() {
        body.push('\n');
    }
    for line in &special {
        body.push_str(&format!("{INDENT}{line}\n"));
    }

    format!(
        r#"<?php

use Illuminate\Database\Migrations\Migration;
use Illuminate\Database\Schema\Blueprint;
use Illuminate\Support\Facades\Schema;

return new class extends Migration
{{
    /**
     * Run the migrations.
     */
    public function up(): void
    {{
        Schema::create('{table}', function (Blueprint $table) {{
{body}        }});
    }}

    /**
     * Reverse the migrations.
     */
    public function down(): void
    {{
        Schema::dropIfExists('{table}');
    }}
}};
"#,
        table = table.name,
        body = body,
    )
}

/// Blueprint statement for one column, or `None` when another directive
/// covers it (foreign keys, timestamps, soft deletes).
pub fn column_line(table: &Table, col: &Column, ctx: &Context) -> Option<String> {
    let name = col.name.as_str();
    if ctx.foreign_key(&table.name, name).is_some() || col.is_timestamp() || name == "deleted_at" {
        return None;
    }

    let base = col.base_type();
    if name == "id" {
        return Some(if is_integral(&base) {
            "$table->id();".to_string()
        } else {
            "$table->string('id');".to_string()
        });
    }

    let enum_values = col.enum_values();
    let method = match migration_method(&base) {
        "enum" if enum_values.is_empty() => "string",
        m => m,
    };

    let mut line = match method {
        "string" | "char" => format!("$table->{method}('{name}', {})", string_length(col)),
        "decimal" => {
            let (precision, scale) = decimal_precision(col);
            format!("$table->decimal('{name}', {precision}, {scale})")
        }
        "enum" => format!("$table->enum('{name}', {})", php_list(&enum_values)),
        m => {
            let mut l = format!("$table->{m}('{name}')");
            if is_integral(&base) && col.auto_increment {
                l.push_str("->autoIncrement()");
            }
            l
        }
    };

    if !col.not_null {
        line.push_str("->nullable()");
    }
    if let Some(default) = default_modifier(col, &base) {
        line.push_str(&default);
    }
    if name.to_lowercase().contains("email") {
        line.push_str("->unique()");
    }
    if let Some(comment) = &col.comment {
        line.push_str(&format!("->comment({})", php_string(comment)));
    }
    line.push(';');
    Some(line)
}

/// Declared length, or 255 when missing, empty, `-1` or not a number.
pub fn string_length(col: &Column) -> u32 {
    col.declared_length().unwrap_or(DEFAULT_STRING_LENGTH)
}

/// Declared precision and scale, or 8/2.
pub fn decimal_precision(col: &Column) -> (u32, u32) {
    let precision = parse_positive(col.precision.as_deref()).unwrap_or(DEFAULT_PRECISION);
    let scale = col
        .scale
        .as_deref()
        .and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|s| *s <= precision)
        .unwrap_or(DEFAULT_SCALE.min(precision));
    (precision, scale)
}

fn default_modifier(col: &Column, base: &str) -> Option<String> {
    let raw = col.default.as_deref()?.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("null") {
        return None;
    }

    let upper = raw.to_uppercase();
    if is_temporal(base) && (upper.starts_with("CURRENT_TIMESTAMP") || upper == "NOW()") {
        return Some("->useCurrent()".to_string());
    }

    let unquoted = unquote(raw);
    if is_bare_literal(base) {
        let lower = unquoted.to_lowercase();
        if lower == "true" || lower == "false" || unquoted.parse::<f64>().is_ok() {
            return Some(format!("->default({lower})"));
        }
    }
    Some(format!("->default({})", php_string(unquoted)))
}

fn unquote(raw: &str) -> &str {
    for quote in ['\'', '"'] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            return &raw[1..raw.len() - 1];
        }
    }
    raw
}

pub fn foreign_key_line(fk: &ForeignKey) -> String {
    let mut line = format!("$table->foreignId('{}')", fk.column);
    if fk.nullable {
        line.push_str("->nullable()");
    }
    if let Some((table, column)) = &fk.target {
        if column == "id" {
            line.push_str(&format!("->constrained('{table}')"));
        } else {
            line.push_str(&format!("->constrained('{table}', '{column}')"));
        }
        if let Some((on_delete, on_update)) = fk.rules {
            line.push_str(delete_rule(on_delete));
            line.push_str(update_rule(on_update));
        }
    }
    line.push(';');
    line
}

fn composite_line(rel: &Relationship) -> String {
    let pairs = rel.column_pairs();
    let sources: Vec<&str> = pairs.iter().map(|(s, _)| *s).collect();
    let targets: Vec<&str> = pairs.iter().map(|(_, t)| *t).collect();
    format!(
        "$table->foreign({})->references({})->on('{}'){}{};",
        php_list(&sources),
        php_list(&targets),
        rel.target.name(),
        delete_rule(rel.on_delete),
        update_rule(rel.on_update),
    )
}

/// Nearest Laravel shorthand; NO ACTION behaves like RESTRICT in MySQL.
fn delete_rule(action: ReferentialAction) -> &'static str {
    match action {
        ReferentialAction::Cascade => "->cascadeOnDelete()",
        ReferentialAction::SetNull => "->nullOnDelete()",
        ReferentialAction::Restrict | ReferentialAction::NoAction => "->restrictOnDelete()",
    }
}

fn update_rule(action: ReferentialAction) -> &'static str {
    match action {
        ReferentialAction::Cascade => "->cascadeOnUpdate()",
        ReferentialAction::SetNull => "->nullOnUpdate()",
        ReferentialAction::Restrict | ReferentialAction::NoAction => "->restrictOnUpdate()",
    }
}

/// UNIQUE indexes and a composite primary key for tables without `id`.
fn index_lines(table: &Table) -> Vec<String> {
    let mut lines = Vec::new();
    for index in &table.indexes {
        if index.columns.is_empty() {
            continue;
        }
        let kind = index.kind.to_uppercase();
        if kind == "PRIMARY" {
            if index.columns.len() > 1 && table.column("id").is_none() {
                lines.push(format!("$table->primary({});", php_list(&index.columns)));
            }
            continue;
        }
        if !(index.unique || kind == "UNIQUE") {
            continue;
        }
        // Single email columns already carry ->unique().
        if let [only] = index.columns.as_slice() {
            if only.to_lowercase().contains("email") {
                continue;
            }
        }
        if index.name.is_empty() {
            lines.push(format!("$table->unique({});", php_list(&index.columns)));
        } else {
            lines.push(format!(
                "$table->unique({}, {});",
                php_list(&index.columns),
                php_string(&index.name)
            ));
        }
    }
    lines
}

/// Whether the migration mapping recognises the column's type.
pub fn has_known_type(col: &Column) -> bool {
    types::is_known(&col.base_type())
}

/// Whether a string column's declared length is unusable.
pub fn has_invalid_length(col: &Column) -> bool {
    is_string(&col.base_type()) && col.declared_length().is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Index, Reference, Schema};
    use crate::config::GeneratorConfig;

    fn posts_schema() -> Schema {
        let mut title = Column::new("title", "VARCHAR").with_length("100");
        title.comment = Some("Post's headline".into());
        let mut status = Column::new("status", "ENUM").not_null();
        status.explicit_params = Some("('draft','published')".into());
        status.default = Some("'draft'".into());
        let mut views = Column::new("views", "INT").not_null();
        views.default = Some("0".into());
        let mut published = Column::new("published_at", "TIMESTAMP");
        published.default = Some("CURRENT_TIMESTAMP".into());

        Schema {
            tables: vec![
                Table::new("users", vec![Column::new("id", "BIGINT").not_null()]),
                Table::new(
                    "posts",
                    vec![
                        Column::new("id", "BIGINT").not_null(),
                        Column::new("user_id", "BIGINT").not_null(),
                        title,
                        status,
                        views,
                        published,
                        Column::new("contact_email", "VARCHAR").with_length("-1"),
                        Column::new("price", "DECIMAL"),
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
                on_update: ReferentialAction::NoAction,
            }],
        }
    }

    fn line(schema: &Schema, column: &str) -> Option<String> {
        let config = GeneratorConfig::default();
        let ctx = Context::new(schema, &config);
        let table = schema.table("posts").unwrap();
        column_line(table, table.column(column).unwrap(), &ctx)
    }

    #[test]
    fn test_string_lengths() {
        let col = Column::new("code", "varchar").with_length("-1");
        assert_eq!(string_length(&col), 255);
        let col = Column::new("code", "varchar").with_length("50");
        assert_eq!(string_length(&col), 50);
        let col = Column::new("code", "varchar").with_length("");
        assert_eq!(string_length(&col), 255);
        let col = Column::new("code", "varchar").with_length("abc");
        assert_eq!(string_length(&col), 255);
    }

    #[test]
    fn test_decimal_defaults() {
        assert_eq!(decimal_precision(&Column::new("price", "DECIMAL")), (8, 2));
        let mut col = Column::new("price", "DECIMAL");
        col.precision = Some("10".into());
        col.scale = Some("0".into());
        assert_eq!(decimal_precision(&col), (10, 0));
        col.precision = Some("-1".into());
        col.scale = Some("x".into());
        assert_eq!(decimal_precision(&col), (8, 2));
    }

    #[test]
    fn test_column_lines() {
        let schema = posts_schema();
        assert_eq!(line(&schema, "id").unwrap(), "$table->id();");
        assert_eq!(line(&schema, "user_id"), None);
        assert_eq!(line(&schema, "created_at"), None);
        assert_eq!(line(&schema, "deleted_at"), None);
        assert_eq!(
            line(&schema, "title").unwrap(),
            r"$table->string('title', 100)->nullable()->comment('Post\'s headline');"
        );
        assert_eq!(
            line(&schema, "status").unwrap(),
            "$table->enum('status', ['draft', 'published'])->default('draft');"
        );
        assert_eq!(line(&schema, "views").unwrap(), "$table->integer('views')->default(0);");
        assert_eq!(
            line(&schema, "published_at").unwrap(),
            "$table->timestamp('published_at')->nullable()->useCurrent();"
        );
        assert_eq!(
            line(&schema, "contact_email").unwrap(),
            "$table->string('contact_email', 255)->nullable()->unique();"
        );
        assert_eq!(
            line(&schema, "price").unwrap(),
            "$table->decimal('price', 8, 2)->nullable();"
        );
    }

    #[test]
    fn test_non_integral_id() {
        let schema = Schema {
            tables: vec![Table::new("posts", vec![Column::new("id", "CHAR").with_length("36")])],
            relationships: vec![],
        };
        assert_eq!(line(&schema, "id").unwrap(), "$table->string('id');");
    }

    #[test]
    fn test_render_migration() {
        let schema = posts_schema();
        let config = GeneratorConfig::default();
        let ctx = Context::new(&schema, &config);
        let out = render(schema.table("posts").unwrap(), &ctx);

        assert!(out.contains("Schema::create('posts', function (Blueprint $table) {"));
        assert!(out.contains(
            "$table->foreignId('user_id')->constrained('users')->cascadeOnDelete()->restrictOnUpdate();"
        ));
        assert!(out.contains("            $table->timestamps();\n            $table->softDeletes();"));
        assert!(out.contains("Schema::dropIfExists('posts');"));
        assert!(!out.contains("'created_at'"));
    }

    #[test]
    fn test_nullable_foreign_key() {
        let fk = ForeignKey {
            column: "parent_id".into(),
            target: Some(("categories".into(), "id".into())),
            rules: Some((ReferentialAction::SetNull, ReferentialAction::Cascade)),
            nullable: true,
        };
        assert_eq!(
            foreign_key_line(&fk),
            "$table->foreignId('parent_id')->nullable()->constrained('categories')->nullOnDelete()->cascadeOnUpdate();"
        );

        let unknown = ForeignKey {
            column: "legacy_id".into(),
            target: None,
            rules: None,
            nullable: false,
        };
        assert_eq!(foreign_key_line(&unknown), "$table->foreignId('legacy_id');");
    }

    #[test]
    fn test_composite_foreign_key() {
        let rel = Relationship {
            name: "fk_grades".into(),
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
            on_update: ReferentialAction::Restrict,
        };
        assert_eq!(
            composite_line(&rel),
            "$table->foreign(['student_id', 'course_id'])->references(['student_id', 'course_id'])->on('enrollments')->cascadeOnDelete()->restrictOnUpdate();"
        );
    }

    #[test]
    fn test_index_lines() {
        let mut table = Table::new(
            "enrollments",
            vec![Column::new("student_id", "BIGINT"), Column::new("course_id", "BIGINT")],
        );
        table.indexes = vec![
            Index {
                name: "PRIMARY".into(),
                kind: "PRIMARY".into(),
                unique: false,
                columns: vec!["student_id".into(), "course_id".into()],
            },
            Index {
                name: "code_UNIQUE".into(),
                kind: "UNIQUE".into(),
                unique: true,
                columns: vec!["code".into()],
            },
            Index {
                name: "email_UNIQUE".into(),
                kind: "UNIQUE".into(),
                unique: true,
                columns: vec!["email".into()],
            },
            Index {
                name: "fk_idx".into(),
                kind: "INDEX".into(),
                unique: false,
                columns: vec!["course_id".into()],
            },
        ];
        assert_eq!(
            index_lines(&table),
            vec![
                "$table->primary(['student_id', 'course_id']);".to_string(),
                "$table->unique(['code'], 'code_UNIQUE');".to_string(),
            ]
        );
    }

    #[test]
    fn test_diagnostic_helpers() {
        assert!(has_invalid_length(&Column::new("name", "varchar").with_length("-1")));
        assert!(!has_invalid_length(&Column::new("name", "varchar").with_length("45")));
        assert!(!has_invalid_length(&Column::new("body", "text")));
        assert!(!has_known_type(&Column::new("shape", "geometry")));
    }
}
