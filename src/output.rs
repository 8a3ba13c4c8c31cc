//! Staged writing of the generated tree.
//!
//! Every run replaces the whole output directory. Files are written into a
//! temporary sibling directory first and the finished tree is renamed into
//! place, so a failed run leaves the previous output untouched. If the old
//! tree cannot even be put back, it is kept in a sibling directory.

use crate::emit::Rendered;
use crate::error::GenerateError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
#[error("{}: {source}", path.display())]
pub struct WriteFailure {
    pub path: PathBuf,
    pub source: io::Error,
}

#[derive(Debug, Default)]
pub struct WriteReport {
    /// Final paths of the files written.
    pub written: Vec<PathBuf>,
    pub failures: Vec<WriteFailure>,
}

impl WriteReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Replace `output` with the rendered tree.
///
/// Failed files are collected in the report. Unless `allow_partial` is set,
/// any failure aborts before the swap and returns
/// [`GenerateError::PartialOutput`].
pub fn write_tree(
    output: &Path,
    rendered: &Rendered,
    allow_partial: bool,
) -> Result<WriteReport, GenerateError> {
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(|source| output_error(&parent, source))?;

    let staging = tempfile::Builder::new()
        .prefix(".mwbgen-")
        .tempdir_in(&parent)
        .map_err(|source| output_error(&parent, source))?;
    debug!("output: staging into {}", staging.path().display());

    for dir in &rendered.directories {
        let path = staging.path().join(dir);
        fs::create_dir_all(&path).map_err(|source| output_error(&path, source))?;
    }

    let mut report = WriteReport::default();
    for artifact in &rendered.artifacts {
        let staged = staging.path().join(&artifact.path);
        let target = output.join(&artifact.path);
        match write_file(&staged, &artifact.contents) {
            Ok(()) => report.written.push(target),
            Err(source) => {
                warn!("output: cannot write {}: {}", target.display(), source);
                report.failures.push(WriteFailure { path: target, source });
            }
        }
    }

    if !report.is_complete() && !allow_partial {
        return Err(GenerateError::PartialOutput(report));
    }

    swap_into_place(staging, output, &parent)?;
    info!("output: {} files written to {}", report.written.len(), output.display());
    Ok(report)
}

fn write_file(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, contents)
}

fn swap_into_place(staging: TempDir, output: &Path, parent: &Path) -> Result<(), GenerateError> {
    swap_with(staging, output, parent, |from, to| fs::rename(from, to))
}

/// Moves `output` aside, moves `staging` into its place and removes the old
/// tree. When the new tree cannot be moved in, the old one is put back; if
/// that fails too it stays on disk and its path is returned in the error.
fn swap_with(
    staging: TempDir,
    output: &Path,
    parent: &Path,
    mut rename: impl FnMut(&Path, &Path) -> io::Result<()>,
) -> Result<(), GenerateError> {
    let trash = tempfile::Builder::new()
        .prefix(".mwbgen-old-")
        .tempdir_in(parent)
        .map_err(|source| output_error(parent, source))?;
    let previous = trash.path().join("previous");

    let had_previous = output.exists();
    if had_previous {
        rename(output, previous.as_path()).map_err(|source| output_error(output, source))?;
    }
    if let Err(source) = rename(staging.path(), output) {
        if had_previous {
            if let Err(restore) = rename(previous.as_path(), output) {
                let kept = trash.keep().join("previous");
                warn!("output: cannot restore {}: {}", output.display(), restore);
                return Err(GenerateError::Swap {
                    path: output.to_path_buf(),
                    kept,
                    source,
                });
            }
        }
        return Err(output_error(output, source));
    }
    // The staging path is gone after the rename; dropping the guard only
    // removes the previous tree.
    drop(staging);
    drop(trash);
    Ok(())
}

fn output_error(path: &Path, source: io::Error) -> GenerateError {
    GenerateError::Output {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::{Artifact, ArtifactKind};

    fn rendered(files: &[(&str, &str)]) -> Rendered {
        Rendered {
            directories: vec!["migrations", "models"],
            artifacts: files
                .iter()
                .map(|(path, contents)| Artifact {
                    kind: ArtifactKind::Model,
                    table: None,
                    path: PathBuf::from(path),
                    contents: contents.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_write_fresh_tree() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("generated");
        let report = write_tree(&out, &rendered(&[("models/Post.php", "<?php")]), false).unwrap();

        assert!(report.is_complete());
        assert_eq!(report.written, vec![out.join("models/Post.php")]);
        assert_eq!(fs::read_to_string(out.join("models/Post.php")).unwrap(), "<?php");
        assert!(out.join("migrations").is_dir());
    }

    #[test]
    fn test_previous_output_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("generated");
        fs::create_dir_all(out.join("models")).unwrap();
        fs::write(out.join("models/Stale.php"), "old").unwrap();

        write_tree(&out, &rendered(&[("models/Post.php", "new")]), false).unwrap();

        assert!(!out.join("models/Stale.php").exists());
        assert!(out.join("models/Post.php").exists());
        // No staging leftovers next to the output.
        let siblings: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(siblings.len(), 1);
    }

    #[test]
    fn test_failed_write_keeps_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("generated");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("keep.txt"), "keep").unwrap();

        // A file cannot be created below a path that is itself a file.
        let bad = rendered(&[("models/Post.php", "ok"), ("models/Post.php/Inner.php", "bad")]);
        let err = write_tree(&out, &bad, false).unwrap_err();

        match err {
            GenerateError::PartialOutput(report) => {
                assert_eq!(report.failures.len(), 1);
                assert_eq!(report.failures[0].path, out.join("models/Post.php/Inner.php"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(out.join("keep.txt").exists());
    }

    fn previous_tree(dir: &Path) -> (PathBuf, TempDir) {
        let out = dir.join("generated");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("keep.txt"), "keep").unwrap();
        let staging = tempfile::Builder::new().prefix(".mwbgen-").tempdir_in(dir).unwrap();
        fs::write(staging.path().join("new.txt"), "new").unwrap();
        (out, staging)
    }

    #[test]
    fn test_failed_swap_restores_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let (out, staging) = previous_tree(dir.path());

        let mut calls = 0;
        let err = swap_with(staging, &out, dir.path(), |from, to| {
            calls += 1;
            if calls == 2 {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
            } else {
                fs::rename(from, to)
            }
        })
        .unwrap_err();

        assert!(matches!(err, GenerateError::Output { .. }));
        assert_eq!(fs::read_to_string(out.join("keep.txt")).unwrap(), "keep");
        assert!(!out.join("new.txt").exists());
    }

    #[test]
    fn test_failed_restore_keeps_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let (out, staging) = previous_tree(dir.path());

        let mut calls = 0;
        let err = swap_with(staging, &out, dir.path(), |from, to| {
            calls += 1;
            if calls == 1 {
                fs::rename(from, to)
            } else {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
            }
        })
        .unwrap_err();

        match err {
            GenerateError::Swap { path, kept, .. } => {
                assert_eq!(path, out);
                assert_eq!(fs::read_to_string(kept.join("keep.txt")).unwrap(), "keep");
                assert!(kept.starts_with(dir.path()));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!out.exists());
    }

    #[test]
    fn test_partial_output_when_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("generated");
        let bad = rendered(&[("models/Post.php", "ok"), ("models/Post.php/Inner.php", "bad")]);
        let report = write_tree(&out, &bad, true).unwrap();
        assert_eq!(report.failures.len(), 1);
        assert!(out.join("models/Post.php").exists());
    }
}
