//! TOML configuration parsing and validation.
//!
//! The client needs two values to talk to the document store: the server
//! base URL and a bearer token. Both live in a TOML file; the token may
//! instead come from the `DATABASE_INTERFACE_BEARER_TOKEN` environment
//! variable and the URL may be overridden with `DOCSTORE_SERVER_URL`.
//!
//! A missing or incomplete configuration is an error. Nothing is written to
//! disk on behalf of the user.
//!
//! ```toml
//! [server]
//! url = "http://0.0.0.0:8000"
//! bearer_token = "secret"
//! timeout_secs = 600
//!
//! [query]
//! top_k = 3
//!
//! [upload]
//! follow_symlinks = true
//! ```

use anyhow::{bail, Context, Result};
use reqwest::Url;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

use crate::models::DEFAULT_TOP_K;

/// Environment variable consulted when `server.bearer_token` is absent.
pub const TOKEN_ENV: &str = "DATABASE_INTERFACE_BEARER_TOKEN";
/// Environment variable that overrides `server.url`.
pub const SERVER_URL_ENV: &str = "DOCSTORE_SERVER_URL";

const PLACEHOLDER_TOKEN: &str = "your_token_here";
const PLACEHOLDER_SERVER: &str = "your_server_here";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

#[derive(Deserialize, Clone)]
pub struct ServerConfig {
    pub url: String,
    #[serde(default)]
    pub bearer_token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

// Keep the token out of logs and panic messages.
impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("url", &self.url)
            .field("bearer_token", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_timeout_secs() -> u64 {
    600
}

#[derive(Debug, Deserialize, Clone)]
pub struct QueryConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
        }
    }
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    #[serde(default = "default_follow_symlinks")]
    pub follow_symlinks: bool,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: true,
        }
    }
}

fn default_follow_symlinks() -> bool {
    true
}

impl Config {
    /// Build a validated config with default query and upload settings.
    pub fn new(url: impl Into<String>, bearer_token: impl Into<String>) -> Result<Self> {
        let url: String = url.into();
        let config = Self {
            server: ServerConfig {
                url: url.trim().to_string(),
                bearer_token: bearer_token.into(),
                timeout_secs: default_timeout_secs(),
            },
            query: QueryConfig::default(),
            upload: UploadConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Result<Self> {
        self.server.timeout_secs = secs;
        self.validate()?;
        Ok(self)
    }

    /// Base URL without surrounding whitespace or trailing slashes.
    pub fn base_url(&self) -> &str {
        self.server.url.trim().trim_end_matches('/')
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.server.url.trim();
        if url.is_empty() {
            bail!("server.url must be set");
        }
        if url == PLACEHOLDER_SERVER {
            bail!(
                "server.url still has the placeholder value '{}'",
                PLACEHOLDER_SERVER
            );
        }
        let parsed =
            Url::parse(url).with_context(|| format!("server.url is not a valid URL: {}", url))?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => bail!("server.url must use http or https, got '{}'", other),
        }

        let token = self.server.bearer_token.trim();
        if token.is_empty() {
            bail!("server.bearer_token must be set (or export {})", TOKEN_ENV);
        }
        if token == PLACEHOLDER_TOKEN {
            bail!(
                "server.bearer_token still has the placeholder value '{}'",
                PLACEHOLDER_TOKEN
            );
        }

        if self.server.timeout_secs == 0 {
            bail!("server.timeout_secs must be > 0");
        }
        if self.query.top_k == 0 {
            bail!("query.top_k must be >= 1");
        }
        Ok(())
    }
}

/// Read, parse and validate the config file, applying environment overrides.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content, |key| std::env::var(key).ok())
        .with_context(|| format!("Invalid config file: {}", path.display()))
}

/// Parse config text; `env` resolves environment overrides.
pub fn parse_config<F>(content: &str, env: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config: Config =
        toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if let Some(url) = env(SERVER_URL_ENV).filter(|v| !v.trim().is_empty()) {
        config.server.url = url;
    }
    config.server.url = config.server.url.trim().to_string();
    if config.server.bearer_token.trim().is_empty() {
        if let Some(token) = env(TOKEN_ENV) {
            config.server.bearer_token = token;
        }
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn parses_full_config() {
        let cfg = parse_config(
            r#"
[server]
url = "http://localhost:8000/"
bearer_token = "abc"
timeout_secs = 30

[query]
top_k = 5

[upload]
follow_symlinks = false
"#,
            no_env,
        )
        .unwrap();
        assert_eq!(cfg.base_url(), "http://localhost:8000");
        assert_eq!(cfg.server.bearer_token, "abc");
        assert_eq!(cfg.server.timeout_secs, 30);
        assert_eq!(cfg.query.top_k, 5);
        assert!(!cfg.upload.follow_symlinks);
    }

    #[test]
    fn defaults_apply() {
        let cfg = parse_config(
            "[server]\nurl = \"http://localhost:8000\"\nbearer_token = \"abc\"\n",
            no_env,
        )
        .unwrap();
        assert_eq!(cfg.server.timeout_secs, 600);
        assert_eq!(cfg.query.top_k, DEFAULT_TOP_K);
        assert!(cfg.upload.follow_symlinks);
    }

    #[test]
    fn token_from_env() {
        let cfg = parse_config("[server]\nurl = \"http://localhost:8000\"\n", |key| {
            (key == TOKEN_ENV).then(|| "from-env".to_string())
        })
        .unwrap();
        assert_eq!(cfg.server.bearer_token, "from-env");
    }

    #[test]
    fn file_token_wins_over_env() {
        let cfg = parse_config(
            "[server]\nurl = \"http://localhost:8000\"\nbearer_token = \"file\"\n",
            |key| (key == TOKEN_ENV).then(|| "env".to_string()),
        )
        .unwrap();
        assert_eq!(cfg.server.bearer_token, "file");
    }

    #[test]
    fn url_env_overrides_file() {
        let cfg = parse_config(
            "[server]\nurl = \"http://localhost:8000\"\nbearer_token = \"abc\"\n",
            |key| (key == SERVER_URL_ENV).then(|| "https://store.internal".to_string()),
        )
        .unwrap();
        assert_eq!(cfg.base_url(), "https://store.internal");
    }

    #[test]
    fn url_whitespace_is_stripped() {
        let cfg = parse_config(
            "[server]\nurl = \" http://localhost:8000/ \"\nbearer_token = \"abc\"\n",
            no_env,
        )
        .unwrap();
        assert_eq!(cfg.server.url, "http://localhost:8000/");
        assert_eq!(cfg.base_url(), "http://localhost:8000");

        let cfg = parse_config(
            "[server]\nurl = \"http://ignored\"\nbearer_token = \"abc\"\n",
            |key| (key == SERVER_URL_ENV).then(|| "https://store.internal/\n".to_string()),
        )
        .unwrap();
        assert_eq!(cfg.base_url(), "https://store.internal");
    }

    #[test]
    fn missing_token_fails() {
        let err = parse_config("[server]\nurl = \"http://localhost:8000\"\n", no_env)
            .unwrap_err();
        assert!(format!("{:#}", err).contains("bearer_token"));
    }

    #[test]
    fn placeholders_rejected() {
        let err = parse_config(
            "[server]\nurl = \"http://localhost:8000\"\nbearer_token = \"your_token_here\"\n",
            no_env,
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("placeholder"));

        let err = parse_config(
            "[server]\nurl = \"your_server_here\"\nbearer_token = \"abc\"\n",
            no_env,
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("placeholder"));
    }

    #[test]
    fn bad_url_rejected() {
        assert!(Config::new("not a url", "abc").is_err());
        assert!(Config::new("ftp://host", "abc").is_err());
        assert!(Config::new("", "abc").is_err());
    }

    #[test]
    fn zero_values_rejected() {
        let cfg = Config::new("http://localhost:8000", "abc").unwrap();
        assert!(cfg.with_timeout_secs(0).is_err());

        let err = parse_config(
            "[server]\nurl = \"http://localhost:8000\"\nbearer_token = \"abc\"\n[query]\ntop_k = 0\n",
            no_env,
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("top_k"));
    }

    #[test]
    fn debug_redacts_token() {
        let cfg = Config::new("http://localhost:8000", "super-secret").unwrap();
        let dbg = format!("{:?}", cfg);
        assert!(!dbg.contains("super-secret"));
        assert!(dbg.contains("redacted"));
    }
}
