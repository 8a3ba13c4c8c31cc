//! `.mwb` archive access.

use super::ParseError;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;
use zip::result::ZipError;

/// Name of the model document inside the archive.
pub const DOCUMENT_ENTRY: &str = "document.mwb.xml";

/// Upper bound on the buffer reserved from the entry's declared size.
const MAX_PREALLOC: u64 = 8 << 20;

/// Read the model document out of the container at `path`.
pub fn read_document(path: &Path) -> Result<String, ParseError> {
    let file = File::open(path).map_err(|source| ParseError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut archive = ZipArchive::new(file)?;

    let mut entry = match archive.by_name(DOCUMENT_ENTRY) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => {
            return Err(ParseError::MissingDocument(DOCUMENT_ENTRY.to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    let mut xml = String::with_capacity(capacity_hint(entry.size()));
    entry.read_to_string(&mut xml).map_err(ParseError::Read)?;
    Ok(xml)
}

/// The declared size comes from the archive headers and is not trusted.
fn capacity_hint(declared: u64) -> usize {
    usize::try_from(declared.min(MAX_PREALLOC)).unwrap_or(0)
}
