//! Directory upload.
//!
//! Drives [`crate::metadata`] and [`DocstoreClient::upload_file`] over every
//! file under a root: one request per regular file, strictly one at a time,
//! in traversal order. A failure (unreadable file, transport error, timeout,
//! non-200 status) is recorded for that file and the walk continues. The
//! only hard error is a root that is not a directory.

use std::path::{Path, PathBuf};

use crate::client::DocstoreClient;
use crate::error::ClientError;
use crate::metadata::{discover_files, read_entry, relative_path};
use crate::models::{FileUpload, Source, UploadOutcome, UploadReport};
use crate::progress::{UploadProgressEvent, UploadProgressReporter};

/// Options for [`upsert_file`].
#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub source: Source,
    pub author: Option<String>,
    pub follow_symlinks: bool,
}

impl UploadOptions {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            author: None,
            follow_symlinks: true,
        }
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }
}

/// Upload every file under `directory` and return one result per file.
pub fn upsert_file(
    client: &DocstoreClient,
    directory: &Path,
    options: &UploadOptions,
    progress: &dyn UploadProgressReporter,
) -> Result<UploadReport, ClientError> {
    tracing::info!(directory = %directory.display(), source = %options.source, "started upload");
    progress.report(UploadProgressEvent::Discovering {
        root: directory.display().to_string(),
    });

    let files = discover_files(directory, options.follow_symlinks)?;
    Ok(upload_discovered(client, directory, files, options, progress))
}

/// Upload already-discovered items under `directory`, one request each.
///
/// A path that can no longer be read (removed or unreadable since the walk)
/// is recorded as failed without a request.
pub fn upload_discovered<I>(
    client: &DocstoreClient,
    directory: &Path,
    items: I,
    options: &UploadOptions,
    progress: &dyn UploadProgressReporter,
) -> UploadReport
where
    I: IntoIterator<Item = Result<PathBuf, ClientError>>,
{
    let mut report = UploadReport::new(directory);

    for item in items {
        let n = report.files.len() as u64 + 1;
        let (path, result) = match item {
            Ok(path) => {
                let result = read_entry(
                    directory,
                    &path,
                    options.source,
                    options.author.as_deref(),
                )
                .and_then(|entry| client.upload_file(entry));
                (path, result)
            }
            // Walk errors still count as one failed item.
            Err(e) => {
                let path = match &e {
                    ClientError::Walk(we) => we.path().map(Path::to_path_buf).unwrap_or_default(),
                    _ => Default::default(),
                };
                (path, Err(e))
            }
        };

        let rel = relative_path(directory, &path);
        let outcome = match result {
            Ok(()) => {
                tracing::info!(path = %rel, "uploaded successfully");
                progress.report(UploadProgressEvent::Uploaded {
                    path: rel.clone(),
                    n,
                });
                UploadOutcome::Uploaded
            }
            Err(e) => {
                let error = e.to_string();
                tracing::error!(path = %rel, error = %error, "upload failed");
                progress.report(UploadProgressEvent::Failed {
                    path: rel.clone(),
                    error: error.clone(),
                    n,
                });
                UploadOutcome::Failed(error)
            }
        };

        report.files.push(FileUpload {
            relative_path: rel,
            path,
            outcome,
        });
    }

    let uploaded = report.uploaded() as u64;
    let failed = report.failed() as u64;
    tracing::info!(uploaded, failed, "finished upload");
    progress.report(UploadProgressEvent::Finished { uploaded, failed });

    report
}
