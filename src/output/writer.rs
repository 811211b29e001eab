//! Writing an output bundle to disk

use crate::output::types::OutputBundle;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while persisting the output bundle
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Writes every document of the bundle into `dir`
///
/// The directory is created if needed and existing files with the same
/// names are replaced. Returns the paths written, in bundle order.
///
/// # Errors
///
/// Returns `WriteError` on the first file that cannot be written; files
/// written before it are left in place.
pub fn write_bundle(bundle: &OutputBundle, dir: &Path) -> Result<Vec<PathBuf>, WriteError> {
    fs::create_dir_all(dir).map_err(|source| WriteError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(bundle.documents.len());

    for document in &bundle.documents {
        let path = dir.join(&document.file_name);
        fs::write(&path, document.render()).map_err(|source| WriteError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::info!(
            "Wrote {} ({} sections)",
            path.display(),
            document.sections.len()
        );
        written.push(path);
    }

    Ok(written)
}
