//! Directory walker and per-file metadata builder.
//!
//! Walks an upload root recursively (following symlinks unless disabled) and
//! turns each regular file into a [`FileEntry`]: its path relative to the
//! root, its raw bytes, and the [`DocumentMetadata`] sent with the upload.
//!
//! Traversal order is whatever the filesystem yields. Errors for a single
//! entry are returned in-line so a caller can record them and keep going.

use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::ClientError;
use crate::models::{DocumentMetadata, FileEntry, Source};

/// Iterate over every regular file under `root`.
///
/// Fails up front only when `root` is not a directory. Unreadable
/// directories, broken symlinks and symlink loops show up as `Err` items.
pub fn discover_files(
    root: &Path,
    follow_links: bool,
) -> Result<impl Iterator<Item = Result<PathBuf, ClientError>>, ClientError> {
    if !root.is_dir() {
        return Err(ClientError::NotADirectory(root.to_path_buf()));
    }

    let walker = WalkDir::new(root).follow_links(follow_links);
    Ok(walker.into_iter().filter_map(|entry| match entry {
        Ok(entry) if entry.file_type().is_file() => Some(Ok(entry.into_path())),
        Ok(_) => None,
        Err(e) => Some(Err(ClientError::Walk(e))),
    }))
}

/// Path of `path` relative to `root`, as used for the upload filename.
pub fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string()
}

/// Read a discovered file and build its upload entry.
pub fn read_entry(
    root: &Path,
    path: &Path,
    source: Source,
    author: Option<&str>,
) -> Result<FileEntry, ClientError> {
    let bytes = std::fs::read(path).map_err(|source| ClientError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let metadata = document_metadata(path, source, author)?;

    Ok(FileEntry {
        relative_path: relative_path(root, path),
        path: path.to_path_buf(),
        bytes,
        metadata,
    })
}

/// Build the metadata for one file.
pub fn document_metadata(
    path: &Path,
    source: Source,
    author: Option<&str>,
) -> Result<DocumentMetadata, ClientError> {
    let io_err = |source| ClientError::Io {
        path: path.to_path_buf(),
        source,
    };
    let modified = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(io_err)?;
    let modified: DateTime<Utc> = modified.into();

    let url = path.to_string_lossy().to_string();

    Ok(DocumentMetadata {
        source,
        source_id: source_id(path),
        url,
        created_at: modified.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        author: author.filter(|a| !a.is_empty()).map(str::to_string),
    })
}

/// Hex SHA-256 of the path string. Same path, same id.
pub fn source_id(path: &Path) -> String {
    let digest = Sha256::digest(path.to_string_lossy().as_bytes());
    hex::encode(digest)
}
