//! Laravel source generation.
//!
//! [`Generator::render`] turns a sorted schema into an in-memory tree of
//! artifacts; nothing touches the filesystem here.

mod context;
pub mod controller;
pub mod fake;
pub mod migration;
pub mod model;
mod php;
pub mod routes;
pub mod seeder;
pub mod types;

pub use context::{Context, ForeignKey, Relation, RelationKind, is_conventional_fk, model_name};

use crate::ast::Schema;
use crate::config::GeneratorConfig;
use chrono::NaiveDateTime;
use std::path::PathBuf;
use tracing::debug;

pub const MIGRATIONS_DIR: &str = "migrations";
pub const MODELS_DIR: &str = "models";
pub const CONTROLLERS_DIR: &str = "controllers";
pub const ROUTES_DIR: &str = "routes";
pub const SEEDERS_DIR: &str = "seeders";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Migration,
    Model,
    Controller,
    Seeder,
    Routes,
    SeedOrchestrator,
}

/// One generated file, path relative to the output root.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub table: Option<String>,
    pub path: PathBuf,
    pub contents: String,
}

#[derive(Debug, Clone, Default)]
pub struct Rendered {
    /// Subdirectories created even when empty.
    pub directories: Vec<&'static str>,
    pub artifacts: Vec<Artifact>,
}

impl Rendered {
    pub fn count(&self, kind: ArtifactKind) -> usize {
        self.artifacts.iter().filter(|a| a.kind == kind).count()
    }
}

/// Per-run generator state.
pub struct Generator<'a> {
    config: &'a GeneratorConfig,
    timestamp: NaiveDateTime,
    migration_counter: u32,
}

impl<'a> Generator<'a> {
    pub fn new(config: &'a GeneratorConfig, timestamp: NaiveDateTime) -> Self {
        Self {
            config,
            timestamp,
            migration_counter: 0,
        }
    }

    /// Render every artifact for `schema`, whose tables must already be
    /// in dependency order.
    pub fn render(&mut self, schema: &Schema) -> Rendered {
        let ctx = Context::new(schema, self.config);
        let mut rendered = Rendered {
            directories: vec![MIGRATIONS_DIR, MODELS_DIR, CONTROLLERS_DIR, ROUTES_DIR],
            artifacts: Vec::new(),
        };
        if self.config.with_seeders {
            rendered.directories.push(SEEDERS_DIR);
        }

        for table in &schema.tables {
            let model = model_name(&table.name);
            debug!("emit: rendering {} as {}", table.name, model);

            let file = self.next_migration_name(&table.name);
            rendered.artifacts.push(artifact(
                ArtifactKind::Migration,
                Some(&table.name),
                PathBuf::from(MIGRATIONS_DIR).join(file),
                migration::render(table, &ctx),
            ));

            if self.config.is_auth_table(&table.name) {
                debug!("emit: skipping model for auth table {}", table.name);
            } else {
                rendered.artifacts.push(artifact(
                    ArtifactKind::Model,
                    Some(&table.name),
                    PathBuf::from(MODELS_DIR).join(format!("{model}.php")),
                    model::render(table, &ctx),
                ));
            }

            rendered.artifacts.push(artifact(
                ArtifactKind::Controller,
                Some(&table.name),
                PathBuf::from(CONTROLLERS_DIR).join(format!("{model}Controller.php")),
                controller::render(table, &ctx),
            ));
        }

        rendered.artifacts.push(artifact(
            ArtifactKind::Routes,
            None,
            PathBuf::from(ROUTES_DIR).join("api.php"),
            routes::render(schema),
        ));

        if self.config.with_seeders {
            for table in seeder::generated_tables(schema, self.config) {
                rendered.artifacts.push(artifact(
                    ArtifactKind::Seeder,
                    Some(&table.name),
                    PathBuf::from(SEEDERS_DIR).join(format!("{}Seeder.php", model_name(&table.name))),
                    seeder::render(table, &ctx),
                ));
            }
            rendered.artifacts.push(artifact(
                ArtifactKind::SeedOrchestrator,
                None,
                PathBuf::from(SEEDERS_DIR).join("DatabaseSeeder.php"),
                seeder::render_orchestrator(schema, self.config),
            ));
        }

        rendered
    }

    /// `2024_05_01_120000_001_create_posts_table.php`; the counter keeps
    /// tables rendered within the same second in order.
    fn next_migration_name(&mut self, table: &str) -> String {
        self.migration_counter += 1;
        format!(
            "{}_{:03}_create_{}_table.php",
            self.timestamp.format("%Y_%m_%d_%H%M%S"),
            self.migration_counter,
            table
        )
    }
}

fn artifact(kind: ArtifactKind, table: Option<&str>, path: PathBuf, contents: String) -> Artifact {
    Artifact {
        kind,
        table: table.map(str::to_string),
        path,
        contents,
    }
}
