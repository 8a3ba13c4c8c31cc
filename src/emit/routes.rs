//! `routes/api.php`.

use super::context::model_name;
use crate::ast::Schema;
use crate::naming::kebab;

pub fn render(schema: &Schema) -> String {
    let mut out = String::from(
        "<?php\n\nuse Illuminate\\Support\\Facades\\Route;\n\n\
         /*\n\
         |--------------------------------------------------------------------------\n\
         | API Routes\n\
         |--------------------------------------------------------------------------\n\
         */\n\n",
    );
    for table in &schema.tables {
        out.push_str(&route(&table.name));
        out.push('\n');
    }
    out
}

/// `Route::apiResource('order-items', ...\OrderItemController::class);`
pub fn route(table: &str) -> String {
    format!(
        "Route::apiResource('{}', \\App\\Http\\Controllers\\Api\\{}Controller::class);",
        kebab(table),
        model_name(table)
    )
}
