//! Upload progress reporting.
//!
//! Reports what `dsi upsert-file` is doing so users can see which files went
//! through and which failed. Progress is emitted on **stderr** so stdout
//! remains parseable for scripts.

use std::io::Write;

/// A single progress event for a directory upload.
#[derive(Clone, Debug)]
pub enum UploadProgressEvent {
    /// Walking the upload root. Total unknown.
    Discovering { root: String },
    /// `n` items handled so far; this one was uploaded.
    Uploaded { path: String, n: u64 },
    /// `n` items handled so far; this one failed.
    Failed { path: String, error: String, n: u64 },
    /// The walk is done.
    Finished { uploaded: u64, failed: u64 },
}

/// Reports upload progress. Implementations write to stderr (human or JSON).
pub trait UploadProgressReporter: Send + Sync {
    /// Emit a progress event. Called from the upload loop.
    fn report(&self, event: UploadProgressEvent);
}

/// Human-friendly progress on stderr: "upload  1,234  ok      docs/a.md".
pub struct StderrProgress;

impl UploadProgressReporter for StderrProgress {
    fn report(&self, event: UploadProgressEvent) {
        let line = match &event {
            UploadProgressEvent::Discovering { root } => {
                format!("upload {}  discovering...\n", root)
            }
            UploadProgressEvent::Uploaded { path, n } => {
                format!("upload  {:>7}  ok      {}\n", format_number(*n), path)
            }
            UploadProgressEvent::Failed { path, error, n } => {
                format!(
                    "upload  {:>7}  FAILED  {}: {}\n",
                    format_number(*n),
                    path,
                    error
                )
            }
            UploadProgressEvent::Finished { uploaded, failed } => format!(
                "upload done  {} uploaded, {} failed\n",
                format_number(*uploaded),
                format_number(*failed)
            ),
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl UploadProgressReporter for JsonProgress {
    fn report(&self, event: UploadProgressEvent) {
        let obj = event_json(&event);
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

fn event_json(event: &UploadProgressEvent) -> serde_json::Value {
    match event {
        UploadProgressEvent::Discovering { root } => serde_json::json!({
            "event": "progress",
            "phase": "discovering",
            "root": root
        }),
        UploadProgressEvent::Uploaded { path, n } => serde_json::json!({
            "event": "progress",
            "phase": "uploading",
            "status": "ok",
            "path": path,
            "n": n
        }),
        UploadProgressEvent::Failed { path, error, n } => serde_json::json!({
            "event": "progress",
            "phase": "uploading",
            "status": "failed",
            "path": path,
            "error": error,
            "n": n
        }),
        UploadProgressEvent::Finished { uploaded, failed } => serde_json::json!({
            "event": "done",
            "uploaded": uploaded,
            "failed": failed
        }),
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl UploadProgressReporter for NoProgress {
    fn report(&self, _event: UploadProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl std::str::FromStr for ProgressMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(ProgressMode::Off),
            "human" => Ok(ProgressMode::Human),
            "json" => Ok(ProgressMode::Json),
            other => Err(format!(
                "invalid progress mode '{}': must be human, json, or off",
                other
            )),
        }
    }
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// Build a reporter for this mode. Caller passes it to the upload loop.
    pub fn reporter(&self) -> Box<dyn UploadProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_number_comma() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn progress_mode_parse() {
        assert_eq!("json".parse::<ProgressMode>().unwrap(), ProgressMode::Json);
        assert_eq!("off".parse::<ProgressMode>().unwrap(), ProgressMode::Off);
        assert!("loud".parse::<ProgressMode>().is_err());
    }

    #[test]
    fn failed_event_json_carries_error() {
        let v = event_json(&UploadProgressEvent::Failed {
            path: "a.txt".to_string(),
            error: "server returned 500".to_string(),
            n: 2,
        });
        assert_eq!(v["status"], "failed");
        assert_eq!(v["error"], "server returned 500");
        assert_eq!(v["n"], 2);
    }
}
