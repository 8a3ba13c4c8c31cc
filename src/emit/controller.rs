//! API resource controllers.

use super::context::{Context, model_name};
use super::migration::string_length;
use super::php::{php_list, php_string};
use super::types::{is_string, validation_rule};
use crate::ast::{Column, Table};
use crate::naming::{camel, pluralize};

pub fn render(table: &Table, ctx: &Context) -> String {
    let model = model_name(&table.name);
    let var = camel(&model);
    let mut list_var = camel(&pluralize(&model));
    if list_var == var {
        list_var = format!("{var}List");
    }

    let eager = ctx.eager_loads(&table.name);
    let with = if eager.is_empty() {
        String::new()
    } else {
        format!("->with({})", php_list(&eager))
    };
    let load = if eager.is_empty() {
        String::new()
    } else {
        format!("        ${var}->load({});\n\n", php_list(&eager))
    };

    let mut rules = String::new();
    for (column, rule) in validation_rules(table, ctx) {
        rules.push_str(&format!("            {} => {},\n", php_string(&column), php_string(&rule)));
    }

    format!(
        r#"<?php

namespace App\Http\Controllers\Api;

use App\Http\Controllers\Controller;
use App\Models\{model};
use Illuminate\Http\JsonResponse;
use Illuminate\Http\Request;

class {model}Controller extends Controller
{{
    /**
     * Display a listing of the resource.
     */
    public function index(): JsonResponse
    {{
        ${list_var} = {model}::query(){with}->get();

        return response()->json([
            'success' => true,
            'data' => ${list_var},
        ]);
    }}

    /**
     * Store a newly created resource in storage.
     */
    public function store(Request $request): JsonResponse
    {{
        $validated = $request->validate($this->rules());

        ${var} = {model}::create($validated);
{load_after_write}
        return response()->json([
            'success' => true,
            'message' => '{model} created successfully',
            'data' => ${var},
        ], 201);
    }}

    /**
     * Display the specified resource.
     */
    public function show({model} ${var}): JsonResponse
    {{
{load}        return response()->json([
            'success' => true,
            'data' => ${var},
        ]);
    }}

    /**
     * Update the specified resource in storage.
     */
    public function update(Request $request, {model} ${var}): JsonResponse
    {{
        $validated = $request->validate($this->rules());

        ${var}->update($validated);
{load_after_write}
        return response()->json([
            'success' => true,
            'message' => '{model} updated successfully',
            'data' => ${var},
        ]);
    }}

    /**
     * Remove the specified resource from storage.
     */
    public function destroy({model} ${var}): JsonResponse
    {{
        ${var}->delete();

        return response()->json([
            'success' => true,
            'message' => '{model} deleted successfully',
        ]);
    }}

    /**
     * Validation rules shared by store and update.
     */
    private function rules(): array
    {{
        return [
{rules}        ];
    }}
}}
"#,
        load_after_write = if load.is_empty() {
            String::new()
        } else {
            format!("\n{}\n", load.trim_end())
        },
    )
}

/// `(column, rule)` pairs for every column the client may send.
pub fn validation_rules(table: &Table, ctx: &Context) -> Vec<(String, String)> {
    table
        .columns
        .iter()
        .filter(|c| !c.is_framework_managed())
        .map(|c| (c.name.clone(), column_rule(table, c, ctx).join("|")))
        .collect()
}

fn column_rule(table: &Table, col: &Column, ctx: &Context) -> Vec<String> {
    let mut parts = vec![if col.not_null { "required" } else { "nullable" }.to_string()];

    let base = col.base_type();
    let enum_values = col.enum_values();
    if base == "enum" && !enum_values.is_empty() {
        parts.push("string".to_string());
        parts.push(format!("in:{}", enum_values.join(",")));
    } else if let Some(rule) = validation_rule(&base) {
        parts.push(rule.to_string());
    } else if base == "enum" {
        parts.push("string".to_string());
    }
    if is_string(&base) {
        parts.push(format!("max:{}", string_length(col)));
    }

    if let Some((target, column)) = ctx
        .foreign_key(&table.name, &col.name)
        .and_then(|fk| fk.target.as_ref())
    {
        parts.push(format!("exists:{target},{column}"));
    }
    for rel in ctx.composites(&table.name) {
        for (source, target_column) in rel.column_pairs() {
            if source == col.name {
                parts.push(format!("exists:{},{target_column}", rel.target.name()));
            }
        }
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Reference, ReferentialAction, Relationship, Schema};
    use crate::config::GeneratorConfig;

    fn schema() -> Schema {
        let mut status = Column::new("status", "ENUM").not_null();
        status.explicit_params = Some("('draft','published')".into());
        Schema {
            tables: vec![
                Table::new("users", vec![Column::new("id", "BIGINT").not_null()]),
                Table::new(
                    "posts",
                    vec![
                        Column::new("id", "BIGINT").not_null(),
                        Column::new("user_id", "BIGINT").not_null(),
                        Column::new("title", "VARCHAR").with_length("100"),
                        Column::new("slug", "VARCHAR").with_length("-1").not_null(),
                        Column::new("body", "TEXT"),
                        status,
                        Column::new("created_at", "TIMESTAMP"),
                        Column::new("updated_at", "TIMESTAMP"),
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
    fn test_validation_rules() {
        let schema = schema();
        let config = GeneratorConfig::default();
        let ctx = Context::new(&schema, &config);
        let rules = validation_rules(schema.table("posts").unwrap(), &ctx);
        let rules: Vec<(&str, &str)> = rules.iter().map(|(c, r)| (c.as_str(), r.as_str())).collect();
        assert_eq!(
            rules,
            vec![
                ("user_id", "required|integer|exists:users,id"),
                ("title", "nullable|string|max:100"),
                ("slug", "required|string|max:255"),
                ("body", "nullable|string"),
                ("status", "required|string|in:draft,published"),
            ]
        );
    }

    #[test]
    fn test_composite_exists_rules() {
        let mut schema = schema();
        schema.tables.push(Table::new(
            "grades",
            vec![
                Column::new("student_id", "BIGINT").not_null(),
                Column::new("course_id", "BIGINT").not_null(),
            ],
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
                Reference::Resolved("student".into()),
                Reference::Resolved("course".into()),
            ],
            on_delete: ReferentialAction::Cascade,
            on_update: ReferentialAction::Cascade,
        });
        let config = GeneratorConfig::default();
        let ctx = Context::new(&schema, &config);
        let rules = validation_rules(schema.table("grades").unwrap(), &ctx);
        assert_eq!(rules[0].1, "required|integer|exists:enrollments,student");
        assert_eq!(rules[1].1, "required|integer|exists:enrollments,course");
    }

    #[test]
    fn test_post_controller() {
        let schema = schema();
        let config = GeneratorConfig::default();
        let ctx = Context::new(&schema, &config);
        let out = render(schema.table("posts").unwrap(), &ctx);

        assert!(out.contains("class PostController extends Controller"));
        assert!(out.contains("$posts = Post::query()->with(['user'])->get();"));
        assert!(out.contains("$post->load(['user']);"));
        assert!(out.contains("'user_id' => 'required|integer|exists:users,id',"));
        assert!(out.contains("], 201);"));
        assert!(out.contains("'message' => 'Post deleted successfully',"));
    }

    #[test]
    fn test_controller_without_relations() {
        let schema = Schema {
            tables: vec![Table::new("estatus", vec![Column::new("id", "BIGINT")])],
            relationships: vec![],
        };
        let config = GeneratorConfig::default();
        let ctx = Context::new(&schema, &config);
        let out = render(schema.table("estatus").unwrap(), &ctx);
        assert!(out.contains("$estatusList = Estatus::query()->get();"));
        assert!(!out.contains("->load("));
    }
}
