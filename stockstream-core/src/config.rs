//! Application configuration (TOML).
//!
//! Lookup order: explicit path, then `STOCKSTREAM_CONFIG`, then
//! `{config_dir}/stockstream/config.toml`, else built-in defaults.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const CONFIG_ENV: &str = "STOCKSTREAM_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// CSV with `Company Name,Symbol` header.
    pub tickers_file: PathBuf,
    pub cache_dir: PathBuf,
    pub use_cache: bool,
    pub default_start: NaiveDate,
    /// Pause before each fetch; purely cosmetic.
    pub loading_delay_ms: u64,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tickers_file: PathBuf::from("tickers.csv"),
            cache_dir: PathBuf::from("data"),
            use_cache: true,
            default_start: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or_default(),
            loading_delay_ms: 0,
            log_file: None,
        }
    }
}

impl AppConfig {
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve the config file and load it.
    ///
    /// An explicit or env-named file must exist; the per-user file is optional.
    pub fn load(explicit: Option<&Path>, config_dir: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        Self::resolve(explicit, env_path.as_deref(), config_dir)
    }

    fn resolve(
        explicit: Option<&Path>,
        env_path: Option<&Path>,
        config_dir: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        if let Some(path) = explicit.or(env_path) {
            debug!(path = %path.display(), "loading config");
            return Self::from_file(path);
        }
        if let Some(path) = config_dir.map(|d| d.join("stockstream").join("config.toml")) {
            if path.exists() {
                debug!(path = %path.display(), "loading user config");
                return Self::from_file(&path);
            }
        }
        debug!("no config file, using defaults");
        Ok(Self::default())
    }

    pub fn loading_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.loading_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        assert_eq!(AppConfig::from_toml("").unwrap(), AppConfig::default());
    }

    #[test]
    fn partial_toml_overrides() {
        let cfg = AppConfig::from_toml(
            "tickers_file = \"refs/companies.csv\"\nuse_cache = false\ndefault_start = \"2020-06-01\"\n",
        )
        .unwrap();
        assert_eq!(cfg.tickers_file, PathBuf::from("refs/companies.csv"));
        assert!(!cfg.use_cache);
        assert_eq!(cfg.default_start, NaiveDate::from_ymd_opt(2020, 6, 1).unwrap());
        assert_eq!(cfg.cache_dir, PathBuf::from("data"));
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(AppConfig::from_toml("tickers = \"x\"").is_err());
    }

    #[test]
    fn explicit_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("explicit.toml");
        std::fs::write(&explicit, "loading_delay_ms = 250\n").unwrap();
        let user = dir.path().join("stockstream");
        std::fs::create_dir_all(&user).unwrap();
        std::fs::write(user.join("config.toml"), "loading_delay_ms = 5\n").unwrap();

        let cfg = AppConfig::resolve(Some(&explicit), None, Some(dir.path())).unwrap();
        assert_eq!(cfg.loading_delay_ms, 250);

        let cfg = AppConfig::resolve(None, None, Some(dir.path())).unwrap();
        assert_eq!(cfg.loading_delay_ms, 5);
    }

    #[test]
    fn missing_explicit_file_is_error() {
        let err = AppConfig::resolve(Some(Path::new("/nonexistent/cfg.toml")), None, None);
        assert!(matches!(err, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn missing_user_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AppConfig::resolve(None, None, Some(dir.path())).unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "use_cache = \"maybe\"").unwrap();
        assert!(matches!(
            AppConfig::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
