//! Core data models exchanged with the document store.
//!
//! These types describe the metadata attached to uploaded files, the
//! request envelopes for the JSON endpoints, and the per-file results of a
//! directory upload.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default number of results requested per query.
pub const DEFAULT_TOP_K: usize = 3;

/// Where an ingested document originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Email,
    File,
    Chat,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Email => "email",
            Source::File => "file",
            Source::Chat => "chat",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(Source::Email),
            "file" => Ok(Source::File),
            "chat" => Ok(Source::Chat),
            other => Err(format!(
                "unknown source '{}': must be email, file, or chat",
                other
            )),
        }
    }
}

/// Metadata sent alongside each uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub source: Source,
    /// Hex SHA-256 of the file path; stable across re-uploads of the same path.
    pub source_id: String,
    pub url: String,
    /// RFC 3339 modification time of the file.
    pub created_at: String,
    pub author: Option<String>,
}

/// A single text document for the `/upsert` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpsertRequest {
    pub documents: Vec<Document>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub query: String,
    pub top_k: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest {
    pub queries: Vec<Query>,
}

/// A regular file discovered under an upload root, ready to send.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Path relative to the upload root; used as the multipart filename.
    pub relative_path: String,
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub metadata: DocumentMetadata,
}

/// Result of uploading one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct FileUpload {
    pub relative_path: String,
    pub path: PathBuf,
    pub outcome: UploadOutcome,
}

impl FileUpload {
    pub fn is_uploaded(&self) -> bool {
        self.outcome == UploadOutcome::Uploaded
    }
}

/// Per-file results of a directory upload, in traversal order.
#[derive(Debug, Clone)]
pub struct UploadReport {
    pub root: PathBuf,
    pub files: Vec<FileUpload>,
}

impl UploadReport {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: Vec::new(),
        }
    }

    pub fn uploaded(&self) -> usize {
        self.files.iter().filter(|f| f.is_uploaded()).count()
    }

    pub fn failed(&self) -> usize {
        self.files.len() - self.uploaded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileUpload> {
        self.files.iter().filter(|f| !f.is_uploaded())
    }

    /// True when every discovered file was uploaded (vacuously true when empty).
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Source::Email).unwrap(), "\"email\"");
        assert_eq!(serde_json::to_string(&Source::File).unwrap(), "\"file\"");
        assert_eq!(serde_json::to_string(&Source::Chat).unwrap(), "\"chat\"");
    }

    #[test]
    fn source_parses_case_insensitively() {
        assert_eq!("FILE".parse::<Source>().unwrap(), Source::File);
        assert_eq!(" chat ".parse::<Source>().unwrap(), Source::Chat);
        assert!("slack".parse::<Source>().is_err());
    }

    #[test]
    fn upsert_request_shape() {
        let req = UpsertRequest {
            documents: vec![Document {
                id: "id1".to_string(),
                text: "hello".to_string(),
            }],
        };
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"documents":[{"id":"id1","text":"hello"}]}"#
        );
    }

    #[test]
    fn query_request_shape() {
        let req = QueryRequest {
            queries: vec![Query {
                query: "what is up".to_string(),
                top_k: DEFAULT_TOP_K,
            }],
        };
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"queries":[{"query":"what is up","top_k":3}]}"#
        );
    }

    #[test]
    fn metadata_without_author_serializes_null() {
        let meta = DocumentMetadata {
            source: Source::File,
            source_id: "abc".to_string(),
            url: "docs/a.md".to_string(),
            created_at: "2024-01-01T00:00:00+00:00".to_string(),
            author: None,
        };
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["source"], "file");
        assert!(value["author"].is_null());
    }

    #[test]
    fn report_counts() {
        let mut report = UploadReport::new("/tmp/x");
        assert!(report.is_success());
        report.files.push(FileUpload {
            relative_path: "a".to_string(),
            path: PathBuf::from("/tmp/x/a"),
            outcome: UploadOutcome::Uploaded,
        });
        report.files.push(FileUpload {
            relative_path: "b".to_string(),
            path: PathBuf::from("/tmp/x/b"),
            outcome: UploadOutcome::Failed("500".to_string()),
        });
        assert_eq!(report.uploaded(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_success());
        assert_eq!(report.failures().next().unwrap().relative_path, "b");
    }
}
