//! Blocking HTTP client for the document store.
//!
//! Wraps the three endpoints exposed by the store:
//!
//! | Endpoint | Body | Method |
//! |----------|------|--------|
//! | `POST /upsert-file` | multipart: `file` + `metadata` | [`DocstoreClient::upload_file`] |
//! | `POST /upsert` | `{"documents": [{"id", "text"}]}` | [`DocstoreClient::upsert`] |
//! | `POST /query` | `{"queries": [{"query", "top_k"}]}` | [`DocstoreClient::query_database`] |
//!
//! Every request carries `Authorization: Bearer <token>` and is bounded by
//! the configured timeout. Only `200 OK` counts as success; anything else
//! becomes [`ClientError::Status`] with the response body attached. There
//! are no retries.

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;

use crate::config::Config;
use crate::error::ClientError;
use crate::models::{Document, FileEntry, Query, QueryRequest, UpsertRequest};

const UPSERT_FILE_PATH: &str = "upsert-file";
const UPSERT_PATH: &str = "upsert";
const QUERY_PATH: &str = "query";

pub struct DocstoreClient {
    http: Client,
    base_url: String,
    top_k: usize,
}

impl DocstoreClient {
    /// Build a client from a validated config.
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        let token = config.server.bearer_token.trim();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.server.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url().to_string(),
            top_k: config.query.top_k,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Upload one file with its metadata as a multipart form.
    pub fn upload_file(&self, entry: FileEntry) -> Result<(), ClientError> {
        let metadata_json = serde_json::to_string(&entry.metadata)?;

        let file_part = Part::bytes(entry.bytes)
            .file_name(entry.relative_path)
            .mime_str("text/plain")?;
        let metadata_part = Part::text(metadata_json).mime_str("application/json")?;
        let form = Form::new()
            .part("file", file_part)
            .part("metadata", metadata_part);

        let url = self.endpoint(UPSERT_FILE_PATH);
        tracing::debug!(%url, path = %entry.path.display(), "uploading file");
        let resp = self.http.post(&url).multipart(form).send()?;
        check_status(resp)?;
        Ok(())
    }

    /// Upload one piece of text under an explicit id.
    pub fn upsert(&self, id: &str, text: &str) -> Result<(), ClientError> {
        let req = UpsertRequest {
            documents: vec![Document {
                id: id.to_string(),
                text: text.to_string(),
            }],
        };
        self.post_json(UPSERT_PATH, &req)?;
        Ok(())
    }

    /// Query with the configured top-k and return the response body as-is.
    pub fn query_database(&self, prompt: &str) -> Result<serde_json::Value, ClientError> {
        self.query_with_top_k(prompt, self.top_k)
    }

    pub fn query_with_top_k(
        &self,
        prompt: &str,
        top_k: usize,
    ) -> Result<serde_json::Value, ClientError> {
        let req = QueryRequest {
            queries: vec![Query {
                query: prompt.to_string(),
                top_k,
            }],
        };
        let resp = self.post_json(QUERY_PATH, &req)?;
        let body = resp.text()?;
        let result: serde_json::Value = serde_json::from_str(&body)?;
        tracing::info!(%result, "query result");
        Ok(result)
    }

    fn post_json<T: Serialize>(&self, path: &str, body: &T) -> Result<Response, ClientError> {
        let url = self.endpoint(path);
        tracing::debug!(%url, "posting json");
        let resp = self
            .http
            .post(&url)
            .header(ACCEPT, "application/json")
            .json(body)
            .send()?;
        check_status(resp)
    }
}

fn check_status(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status != StatusCode::OK {
        let body = resp.text().unwrap_or_default();
        return Err(ClientError::Status { status, body });
    }
    Ok(resp)
}
