pub mod ast;
pub mod config;
pub mod diagnostics;
pub mod emit;
pub mod error;
pub mod mwb;
pub mod naming;
pub mod order;
pub mod output;
pub mod report;

use std::path::{Path, PathBuf};

use ast::Schema;
use chrono::Local;
use config::GeneratorConfig;
use emit::{ArtifactKind, Generator};
use error::GenerateError;
use order::BackEdge;
use output::WriteFailure;
use tracing::{info, warn};

/// Summary of a `generate` run.
#[derive(Debug)]
pub struct GenerationReport {
    pub tables: usize,
    pub relationships: usize,
    pub migrations: usize,
    pub models: usize,
    pub controllers: usize,
    pub seeders: usize,
    pub written: Vec<PathBuf>,
    /// Only non-empty when partial output is allowed.
    pub failures: Vec<WriteFailure>,
    pub cycles: Vec<BackEdge>,
    pub unresolved: usize,
}

/// Extract `container`, sort its tables and apply the strictness settings.
pub fn prepare(container: &Path, config: &GeneratorConfig) -> Result<(Schema, Vec<BackEdge>), GenerateError> {
    let schema = mwb::extract(container)?;

    let unresolved: Vec<String> = schema
        .unresolved_references()
        .iter()
        .map(|(rel, r)| format!("{} ({})", r.name(), rel.name))
        .collect();
    if !unresolved.is_empty() {
        if config.strict_references {
            return Err(GenerateError::UnresolvedReferences(unresolved));
        }
        for r in &unresolved {
            warn!("extract: unresolved reference {}", r);
        }
    }

    let sorted = order::sort(schema);
    if config.reject_cycles && !sorted.cycles.is_empty() {
        return Err(GenerateError::CyclicDependencies(sorted.cycles));
    }
    Ok((sorted.schema, sorted.cycles))
}

/// Generate the Laravel tree for `container` into `output`, replacing
/// whatever `output` held before.
pub fn generate(
    container: &Path,
    output: &Path,
    config: &GeneratorConfig,
) -> Result<GenerationReport, GenerateError> {
    let (schema, cycles) = prepare(container, config)?;

    let rendered = Generator::new(config, Local::now().naive_local()).render(&schema);
    let written = output::write_tree(output, &rendered, config.allow_partial)?;

    let report = GenerationReport {
        tables: schema.tables.len(),
        relationships: schema.relationships.len(),
        migrations: rendered.count(ArtifactKind::Migration),
        models: rendered.count(ArtifactKind::Model),
        controllers: rendered.count(ArtifactKind::Controller),
        seeders: rendered.count(ArtifactKind::Seeder),
        written: written.written,
        failures: written.failures,
        cycles,
        unresolved: schema.unresolved_references().len(),
    };
    info!(
        "generate: {} tables, {} relationships, {} files ({} failed)",
        report.tables,
        report.relationships,
        report.written.len(),
        report.failures.len()
    );
    Ok(report)
}

/// Text report of `container` for `mwbgen inspect`.
pub fn inspect(container: &Path) -> Result<String, GenerateError> {
    let schema = mwb::extract(container)?;
    // Listed in model order; the sort only contributes cycles.
    let cycles = order::sort(schema.clone()).cycles;
    let findings = diagnostics::diagnose(&schema, &cycles);
    Ok(report::render(&schema, &findings))
}
