//! # docstore-ingest
//!
//! A thin client for a remote vector document store.
//!
//! It walks a local directory, attaches metadata to every file (a
//! path-derived `source_id`, the modification time, a [`models::Source`]
//! and an optional author) and uploads each one to the store. It can also
//! upsert a single text document and run a top-k query.
//!
//! ```text
//! ┌────────────┐   ┌────────────┐   ┌──────────────────┐
//! │  metadata  │──▶│   ingest   │──▶│  client (HTTP)   │──▶ /upsert-file
//! │ walk + meta│   │ per-file   │   │  bearer + timeout│──▶ /upsert
//! └────────────┘   │ results    │   └──────────────────┘──▶ /query
//!                  └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! dsi check                              # validate config
//! dsi upsert-file ./docs --author ada    # upload a directory
//! dsi upsert note-1 "some text"          # upload one document
//! dsi query "how do I deploy?"           # top-k search
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and validation |
//! | [`models`] | Core data types |
//! | [`metadata`] | Directory walk and per-file metadata |
//! | [`client`] | HTTP client for the store endpoints |
//! | [`ingest`] | Directory upload with per-file results |
//! | [`progress`] | Upload progress reporters |
//! | [`logging`] | `tracing` setup |
//! | [`error`] | Client error type |

pub mod client;
pub mod config;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod metadata;
pub mod models;
pub mod progress;

pub use client::DocstoreClient;
pub use config::Config;
pub use error::ClientError;
pub use ingest::{upload_discovered, upsert_file, UploadOptions};
pub use models::{DocumentMetadata, Source, UploadReport};
