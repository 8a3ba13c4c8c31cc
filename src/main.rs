//! `mwbgen`: generate a Laravel backend from a MySQL Workbench model.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mwbgen::config::GeneratorConfig;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "mwbgen", version, about = "MySQL Workbench model to Laravel generator")]
struct Cli {
    /// Debug logging (overridden by RUST_LOG).
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write migrations, models, controllers, seeders and routes.
    Generate {
        /// Path to the .mwb file.
        model: PathBuf,
        /// Output directory, replaced on every run.
        #[arg(default_value = "laravel_generated")]
        output: PathBuf,
        /// Skip seeders and DatabaseSeeder.
        #[arg(long)]
        no_seeders: bool,
        /// Rows inserted by each generated seeder.
        #[arg(long, env = "MWBGEN_SEED_ROWS", default_value_t = 10)]
        seed_rows: usize,
        /// Authentication table (no model, hand-written seeder).
        #[arg(long, env = "MWBGEN_AUTH_TABLE", default_value = "users")]
        auth_table: String,
        /// Tables with hand-written seeders, comma separated.
        #[arg(
            long,
            env = "MWBGEN_HAND_SEEDED",
            value_delimiter = ',',
            default_value = "users,roles,estatus,status"
        )]
        hand_seeded: Vec<String>,
        /// Fail on references that cannot be resolved.
        #[arg(long, env = "MWBGEN_STRICT")]
        strict: bool,
        /// Fail on cyclic foreign keys.
        #[arg(long)]
        reject_cycles: bool,
        /// Keep the output even when some files fail to write.
        #[arg(long)]
        allow_partial: bool,
    },

    /// Print tables, relationships and diagnostics.
    Inspect {
        /// Path to the .mwb file.
        model: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Generate {
            model,
            output,
            no_seeders,
            seed_rows,
            auth_table,
            hand_seeded,
            strict,
            reject_cycles,
            allow_partial,
        } => {
            let config = GeneratorConfig {
                auth_table,
                hand_seeded_tables: hand_seeded,
                seed_rows,
                with_seeders: !no_seeders,
                strict_references: strict,
                reject_cycles,
                allow_partial,
            };
            let report = mwbgen::generate(&model, &output, &config)
                .with_context(|| format!("generating from {}", model.display()))?;

            println!(
                "{} tables: {} migrations, {} models, {} controllers, {} seeders",
                report.tables, report.migrations, report.models, report.controllers, report.seeders
            );
            println!("{} files written to {}", report.written.len(), output.display());
            for edge in &report.cycles {
                println!("warning: cyclic foreign key {} -> {}", edge.from, edge.to);
            }
            if report.unresolved > 0 {
                println!("warning: {} unresolved references", report.unresolved);
            }
            for failure in &report.failures {
                eprintln!("failed: {failure}");
            }
        }
        Commands::Inspect { model } => {
            let text = mwbgen::inspect(&model)
                .with_context(|| format!("inspecting {}", model.display()))?;
            print!("{text}");
        }
    }
    Ok(())
}
