//! MySQL Workbench model (`.mwb`) extraction.

mod container;
pub mod correct;
mod extract;

pub use container::{DOCUMENT_ENTRY, read_document};
pub use extract::extract_document;

use crate::ast::Schema;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Not a model container: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("Container has no {0} entry")]
    MissingDocument(String),
    #[error("Cannot read model document: {0}")]
    Read(std::io::Error),
    #[error("Malformed model document: {0}")]
    Malformed(#[from] roxmltree::Error),
}

/// Extract the schema from the container at `path`.
pub fn extract(path: &Path) -> Result<Schema, ParseError> {
    let xml = read_document(path)?;
    let schema = extract_document(&xml)?;
    tracing::info!(
        "extract: {} tables, {} relationships from {}",
        schema.tables.len(),
        schema.relationships.len(),
        path.display()
    );
    Ok(schema)
}
