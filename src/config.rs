//! Configuration file loading with environment variable overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::adapters::live::openai::DEFAULT_OPENAI_MODEL;
use crate::adapters::placeholder::DEFAULT_PLACEHOLDER_URL;
use crate::backend::BackendKind;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// API key configuration.
    #[serde(default)]
    pub keys: KeysConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Image backend chain settings.
    #[serde(default)]
    pub images: ImagesConfig,

    /// Phrase storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// API key configuration.
#[derive(Debug, Default, Deserialize)]
pub struct KeysConfig {
    /// `OpenAI` API key.
    pub openai: Option<String>,
    /// Pixabay API key.
    pub pixabay: Option<String>,
}

/// HTTP server settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Image backend chain settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Backend names in priority order.
    pub backends: Vec<String>,
    /// URL returned by the `placeholder` backend.
    pub placeholder_url: String,
    /// Model used by the `openai` backend.
    pub openai_model: String,
    /// Per-backend timeout in milliseconds, `0` disables it.
    pub timeout_ms: u64,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            backends: vec!["dummy".to_string()],
            placeholder_url: DEFAULT_PLACEHOLDER_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            timeout_ms: 0,
        }
    }
}

/// Phrase storage settings.
#[derive(Debug, Default, Deserialize)]
pub struct StorageConfig {
    /// `SQLite` database path; phrases stay in memory when unset.
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    /// Get the `OpenAI` API key, preferring environment variable.
    #[must_use]
    pub fn openai_key(&self) -> Option<String> {
        std::env::var("OPENAI_API_KEY")
            .ok()
            .or_else(|| self.keys.openai.clone())
    }

    /// Get the Pixabay API key, preferring environment variable.
    #[must_use]
    pub fn pixabay_key(&self) -> Option<String> {
        std::env::var("PIXABAY_API_KEY")
            .ok()
            .or_else(|| self.keys.pixabay.clone())
    }

    /// Listen address, preferring `PHRASEBOOK_BIND`.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        std::env::var("PHRASEBOOK_BIND")
            .unwrap_or_else(|_| self.server.bind.clone())
    }

    /// Resolve the configured backend names.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first unknown backend.
    pub fn backend_kinds(&self) -> Result<Vec<BackendKind>, String> {
        self.images
            .backends
            .iter()
            .map(|name| BackendKind::from_name(name))
            .collect()
    }

    /// Per-backend timeout, if enabled.
    #[must_use]
    pub fn backend_timeout(&self) -> Option<Duration> {
        match self.images.timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `PHRASEBOOK_CONFIG` environment variable
/// 3. `~/.config/phrasebook/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("PHRASEBOOK_CONFIG") {
        return PathBuf::from(p);
    }

    default_config_path()
}

/// Default config path: `~/.config/phrasebook/config.toml`.
fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/phrasebook/config.toml")
    } else {
        PathBuf::from("phrasebook.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.keys.openai.is_none());
        assert!(config.keys.pixabay.is_none());
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.images.backends, ["dummy"]);
        assert_eq!(config.images.placeholder_url, DEFAULT_PLACEHOLDER_URL);
        assert_eq!(config.images.openai_model, "dall-e-3");
        assert!(config.backend_timeout().is_none());
        assert!(config.storage.path.is_none());
    }

    #[test]
    fn load_nonexistent_returns_defaults() {
        let config = Config::load(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.backend_kinds().unwrap(), [BackendKind::Dummy]);
    }

    #[test]
    fn load_valid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[keys]
openai = "test-openai-key"
pixabay = "test-pixabay-key"

[server]
bind = "127.0.0.1:9000"

[images]
backends = ["pixabay", "openai", "placeholder"]
placeholder_url = "http://example.com/ok.jpg"
timeout_ms = 1500

[storage]
path = "data/phrases.sqlite"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.keys.openai.as_deref(), Some("test-openai-key"));
        assert_eq!(config.keys.pixabay.as_deref(), Some("test-pixabay-key"));
        assert_eq!(config.server.bind, "127.0.0.1:9000");
        assert_eq!(
            config.backend_kinds().unwrap(),
            [
                BackendKind::Pixabay,
                BackendKind::OpenAi,
                BackendKind::Placeholder
            ]
        );
        assert_eq!(config.images.placeholder_url, "http://example.com/ok.jpg");
        // Omitted fields keep their defaults.
        assert_eq!(config.images.openai_model, "dall-e-3");
        assert_eq!(config.backend_timeout(), Some(Duration::from_millis(1500)));
        let storage = PathBuf::from("data/phrases.sqlite");
        assert_eq!(config.storage.path, Some(storage));
    }

    #[test]
    fn load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "this is not valid toml {{{").unwrap();

        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn unknown_backend_is_reported() {
        let config = Config {
            images: ImagesConfig {
                backends: vec!["dummy".into(), "midjourney".into()],
                ..ImagesConfig::default()
            },
            ..Config::default()
        };
        let err = config.backend_kinds().unwrap_err();
        assert!(err.contains("midjourney"));
    }

    #[test]
    fn pixabay_key_from_file() {
        let config = Config {
            keys: KeysConfig {
                openai: None,
                pixabay: Some("from-file".into()),
            },
            ..Config::default()
        };

        // Without env var, returns file value
        std::env::remove_var("PIXABAY_API_KEY");
        assert_eq!(config.pixabay_key().as_deref(), Some("from-file"));
    }

    #[test]
    fn discover_explicit_path() {
        let path = discover_config_path(Some("/tmp/my-config.toml"));
        assert_eq!(path, PathBuf::from("/tmp/my-config.toml"));
    }
}
