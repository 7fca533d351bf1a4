//! `tracing` subscriber setup for the `dsi` binary.
//!
//! Logs go to stderr by default, or are appended to a log file when one is
//! given. `RUST_LOG` overrides the level: the default is `warn` on stderr
//! (progress already covers per-file status there) and `info` in a log file.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Level used when `RUST_LOG` is unset.
fn default_level(log_file: Option<&Path>) -> &'static str {
    if log_file.is_some() {
        "info"
    } else {
        "warn"
    }
}

pub fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(log_file)));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create log directory: {}", parent.display())
                })?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            builder
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    installed.map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_level_depends_on_destination() {
        assert_eq!(default_level(None), "warn");
        assert_eq!(default_level(Some(Path::new("logs/watcher.log"))), "info");
    }
}
