//! Database seeders.

use super::context::{Context, model_name};
use super::fake::fake_value;
use super::php::{php_list, php_string};
use super::types::is_integral;
use crate::ast::{Schema, Table};
use crate::config::GeneratorConfig;
use crate::naming::{camel, pluralize, singularize};

/// A pre-fetched list of target keys.
struct Lookup {
    var: String,
    statement: String,
}

pub fn render(table: &Table, ctx: &Context) -> String {
    let model = model_name(&table.name);
    let mut lookups: Vec<Lookup> = Vec::new();
    let mut row_picks: Vec<String> = Vec::new();
    let mut values: Vec<(String, String)> = Vec::new();

    for col in &table.columns {
        let name = col.name.as_str();
        if name == "deleted_at" {
            continue;
        }
        if name == "id" {
            if !is_integral(&col.base_type()) {
                values.push((name.to_string(), "fake()->uuid()".to_string()));
            }
            continue;
        }
        if col.is_timestamp() {
            values.push((name.to_string(), "now()".to_string()));
            continue;
        }

        let fallback = if col.not_null { "1" } else { "null" };
        if let Some(fk) = ctx.foreign_key(&table.name, name) {
            let expr = match &fk.target {
                Some((target, column)) => {
                    let var = camel(&format!("{}_{}", singularize(target), pluralize(column)));
                    add_lookup(
                        &mut lookups,
                        &var,
                        format!("DB::table('{target}')->pluck('{column}')->all()"),
                    );
                    format!("!empty(${var}) ? fake()->randomElement(${var}) : {fallback}")
                }
                None => fallback.to_string(),
            };
            values.push((name.to_string(), expr));
            continue;
        }

        let composite = ctx.composites(&table.name).find_map(|rel| {
            rel.column_pairs()
                .into_iter()
                .find(|(source, _)| *source == name)
                .map(|(_, target_column)| (rel, target_column.to_string()))
        });
        if let Some((rel, target_column)) = composite {
            let target = rel.target.name();
            let rows = camel(&format!("{}_rows", singularize(target)));
            let row = camel(&format!("{}_row", singularize(target)));
            let pairs = rel.column_pairs();
            let target_columns: Vec<&str> = pairs.iter().map(|(_, t)| *t).collect();
            if add_lookup(
                &mut lookups,
                &rows,
                format!("DB::table('{target}')->get({})->all()", php_list(&target_columns)),
            ) {
                row_picks.push(format!("${row} = !empty(${rows}) ? fake()->randomElement(${rows}) : null;"));
            }
            values.push((name.to_string(), format!("${row}?->{target_column} ?? {fallback}")));
            continue;
        }

        values.push((name.to_string(), fake_value(col)));
    }

    let mut body = String::new();
    for lookup in &lookups {
        body.push_str(&format!("        ${} = {};\n", lookup.var, lookup.statement));
    }
    if !lookups.is_empty() {
        body.push('\n');
    }
    body.push_str(&format!("        for ($i = 0; $i < {}; $i++) {{\n", ctx.config.seed_rows));
    for pick in &row_picks {
        body.push_str(&format!("            {pick}\n"));
    }
    body.push_str(&format!("            DB::table({})->insert([\n", php_string(&table.name)));
    for (column, expr) in &values {
        body.push_str(&format!("                {} => {expr},\n", php_string(column)));
    }
    body.push_str("            ]);\n        }\n");

    format!(
        r#"<?php

namespace Database\Seeders;

use Illuminate\Database\Seeder;
use Illuminate\Support\Facades\DB;

class {model}Seeder extends Seeder
{{
    /**
     * Run the database seeds.
     */
    public function run(): void
    {{
{body}    }}
}}
"#
    )
}

/// Returns false when `var` was already registered.
fn add_lookup(lookups: &mut Vec<Lookup>, var: &str, statement: String) -> bool {
    if lookups.iter().any(|l| l.var == var) {
        return false;
    }
    lookups.push(Lookup {
        var: var.to_string(),
        statement,
    });
    true
}

/// Tables seeded by generated seeders, in schema order.
pub fn generated_tables<'a>(schema: &'a Schema, config: &GeneratorConfig) -> Vec<&'a Table> {
    schema
        .tables
        .iter()
        .filter(|t| !config.is_hand_seeded(&t.name))
        .collect()
}

/// `DatabaseSeeder`: hand-written seeders first, then the generated ones.
pub fn render_orchestrator(schema: &Schema, config: &GeneratorConfig) -> String {
    let hand: Vec<&Table> = schema
        .tables
        .iter()
        .filter(|t| config.is_hand_seeded(&t.name))
        .collect();
    let generated = generated_tables(schema, config);

    let mut calls = String::new();
    if !hand.is_empty() {
        calls.push_str("            // Hand-written\n");
        for t in &hand {
            calls.push_str(&format!("            {}Seeder::class,\n", model_name(&t.name)));
        }
    }
    if !generated.is_empty() {
        if !hand.is_empty() {
            calls.push('\n');
        }
        calls.push_str("            // Generated\n");
        for t in &generated {
            calls.push_str(&format!("            {}Seeder::class,\n", model_name(&t.name)));
        }
    }

    format!(
        r#"<?php

namespace Database\Seeders;

use Illuminate\Database\Seeder;

class DatabaseSeeder extends Seeder
{{
    /**
     * Seed the application's database.
     */
    public function run(): void
    {{
        $this->call([
{calls}        ]);
    }}
}}
"#
    )
}
