//! Plain-text dump of an extracted schema for `mwbgen inspect`.

use crate::ast::{Column, Reference, ReferentialAction, Relationship, Schema, Table};
use crate::diagnostics::Diagnostic;
use unicode_width::UnicodeWidthStr;

const COLUMN_HEADERS: [&str; 9] = [
    "column", "type", "length", "precision", "scale", "not null", "auto inc", "default", "comment",
];

pub fn render(schema: &Schema, diagnostics: &[Diagnostic]) -> String {
    let mut out = String::new();
    for (i, table) in schema.tables.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&table_section(table));
    }

    out.push_str(&format!("\nRelationships ({})\n", schema.relationships.len()));
    for rel in &schema.relationships {
        out.push_str(&format!("  {}\n", relationship_line(rel)));
    }

    out.push_str(&format!("\nDiagnostics ({})\n", diagnostics.len()));
    for d in diagnostics {
        out.push_str(&format!("  - {d}\n"));
    }
    out
}

fn table_section(table: &Table) -> String {
    let mut title = format!("Table {}", table.name);
    if table.has_soft_deletes {
        title.push_str(" [soft deletes]");
    }
    if let Some(comment) = &table.comment {
        title.push_str(&format!(" -- {comment}"));
    }

    let rows: Vec<Vec<String>> = table.columns.iter().map(column_row).collect();
    let mut out = format!("{title}\n");
    for line in aligned(&COLUMN_HEADERS, &rows) {
        out.push_str(&format!("  {line}\n"));
    }
    for index in &table.indexes {
        out.push_str(&format!(
            "  index {} ({}{}): {}\n",
            index.name,
            index.kind,
            if index.unique { ", unique" } else { "" },
            index.columns.join(", ")
        ));
    }
    out
}

fn column_row(col: &Column) -> Vec<String> {
    let flag = |b: bool| String::from(if b { "yes" } else { "" });
    let opt = |v: &Option<String>| v.clone().unwrap_or_default();
    vec![
        col.name.clone(),
        col.typ.clone(),
        opt(&col.length),
        opt(&col.precision),
        opt(&col.scale),
        flag(col.not_null),
        flag(col.auto_increment),
        opt(&col.default),
        opt(&col.comment),
    ]
}

fn relationship_line(rel: &Relationship) -> String {
    let names = |refs: &[Reference]| {
        refs.iter().map(|r| r.name()).collect::<Vec<_>>().join(", ")
    };
    format!(
        "{}: {}({}) -> {}({}) on delete {} on update {}",
        rel.name,
        rel.source.name(),
        names(&rel.source_columns),
        rel.target.name(),
        names(&rel.target_columns),
        action(rel.on_delete),
        action(rel.on_update),
    )
}

fn action(a: ReferentialAction) -> &'static str {
    match a {
        ReferentialAction::Cascade => "cascade",
        ReferentialAction::SetNull => "set null",
        ReferentialAction::Restrict => "restrict",
        ReferentialAction::NoAction => "no action",
    }
}

/// Rows padded to a common display width per column, header and rule first.
/// Trailing whitespace is trimmed.
pub fn aligned(headers: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.width());
            }
        }
    }

    let format_row = |cells: Vec<&str>| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| pad(cell, *width))
            .collect();
        padded.join(" | ").trim_end().to_string()
    };

    let mut lines = vec![format_row(headers.to_vec())];
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in rows {
        lines.push(format_row(row.iter().map(String::as_str).collect()));
    }
    lines
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{text}{}", " ".repeat(fill))
}
