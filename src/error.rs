use crate::mwb::ParseError;
use crate::order::BackEdge;
use crate::output::WriteReport;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("Unresolved references: {}", .0.join(", "))]
    UnresolvedReferences(Vec<String>),
    #[error("Cyclic foreign keys: {}", format_edges(.0))]
    CyclicDependencies(Vec<BackEdge>),
    #[error("Cannot prepare output {}: {source}", path.display())]
    Output {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The new tree could not be moved in and the old one could not be put
    /// back; it is left at `kept`.
    #[error(
        "Cannot replace output {}: {source}; previous output kept at {}",
        path.display(),
        kept.display()
    )]
    Swap {
        path: PathBuf,
        kept: PathBuf,
        source: std::io::Error,
    },
    #[error("{} files failed to write: {}", .0.failures.len(), format_failures(.0))]
    PartialOutput(WriteReport),
}

fn format_edges(edges: &[BackEdge]) -> String {
    edges
        .iter()
        .map(|e| format!("{} -> {}", e.from, e.to))
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_failures(report: &WriteReport) -> String {
    report
        .failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
