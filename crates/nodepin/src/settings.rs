use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use nodepin_core::{DEFAULT_CATALOG_URL, DEFAULT_SUGGESTION_LIMIT};
use nodepin_nvm::NvmTimeouts;
use nodepin_platform::{AppPaths, AppPathsError};

use crate::orchestrator::OrchestratorConfig;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error(transparent)]
    Paths(#[from] AppPathsError),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{} is not valid settings JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl SettingsError {
    /// Line shown to the operator when the run falls back to defaults.
    /// Printed to stderr regardless of the log level.
    #[must_use]
    pub fn fallback_notice(&self) -> String {
        format!("nodepin: ignoring settings, using defaults: {self}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_declaration_file")]
    pub declaration_file: PathBuf,

    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,

    #[serde(default)]
    pub nvm_dir: Option<PathBuf>,

    #[serde(default)]
    pub auto_install_backend: bool,

    #[serde(default)]
    pub installer_sha256: Option<String>,

    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,

    #[serde(default = "default_install_timeout")]
    pub install_timeout_secs: u64,

    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    #[serde(default)]
    pub prompt_timeout_secs: Option<u64>,

    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,

    #[serde(default)]
    pub debug_logging: bool,

    #[serde(default = "default_max_log_size_bytes")]
    pub max_log_size_bytes: u64,
}

fn default_declaration_file() -> PathBuf {
    PathBuf::from(".nvmrc")
}

fn default_catalog_url() -> String {
    DEFAULT_CATALOG_URL.to_string()
}

fn default_command_timeout() -> u64 {
    60
}

fn default_install_timeout() -> u64 {
    600
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_suggestion_limit() -> usize {
    DEFAULT_SUGGESTION_LIMIT
}

fn default_max_log_size_bytes() -> u64 {
    5 * 1024 * 1024
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            declaration_file: default_declaration_file(),
            catalog_url: default_catalog_url(),
            nvm_dir: None,
            auto_install_backend: false,
            installer_sha256: None,
            command_timeout_secs: default_command_timeout(),
            install_timeout_secs: default_install_timeout(),
            fetch_timeout_secs: default_fetch_timeout(),
            prompt_timeout_secs: None,
            suggestion_limit: default_suggestion_limit(),
            debug_logging: false,
            max_log_size_bytes: default_max_log_size_bytes(),
        }
    }
}

impl AppSettings {
    /// Reads `settings.json` from the config directory. A missing file is
    /// not an error.
    pub fn load() -> Result<Self, SettingsError> {
        let paths = AppPaths::new()?;
        Self::load_from(&paths.settings_file())
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self, SettingsError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(SettingsError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn nvm_timeouts(&self) -> NvmTimeouts {
        NvmTimeouts {
            command: Duration::from_secs(self.command_timeout_secs),
            install: Duration::from_secs(self.install_timeout_secs),
        }
    }

    pub fn orchestrator_config(&self, assume_yes: bool) -> OrchestratorConfig {
        OrchestratorConfig {
            declaration_path: self.declaration_file.clone(),
            auto_install_backend: self.auto_install_backend,
            assume_yes,
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            prompt_timeout: self.prompt_timeout_secs.map(Duration::from_secs),
            suggestion_limit: self.suggestion_limit.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let settings = AppSettings::default();

        assert_eq!(settings.declaration_file, PathBuf::from(".nvmrc"));
        assert_eq!(settings.catalog_url, "https://nodejs.org/dist/index.json");
        assert_eq!(settings.command_timeout_secs, 60);
        assert_eq!(settings.install_timeout_secs, 600);
        assert_eq!(settings.fetch_timeout_secs, 30);
        assert_eq!(settings.prompt_timeout_secs, None);
        assert_eq!(settings.suggestion_limit, 3);
        assert_eq!(settings.max_log_size_bytes, 5 * 1024 * 1024);
        assert!(!settings.auto_install_backend);
        assert!(!settings.debug_logging);
    }

    #[test]
    fn partial_json_fills_remaining_fields_with_defaults() {
        let value = json!({
            "declaration_file": "config/.node-version",
            "install_timeout_secs": 1200,
            "prompt_timeout_secs": 45
        });

        let settings: AppSettings =
            serde_json::from_value(value).expect("settings JSON should deserialize");

        assert_eq!(
            settings.declaration_file,
            PathBuf::from("config/.node-version")
        );
        assert_eq!(settings.install_timeout_secs, 1200);
        assert_eq!(settings.prompt_timeout_secs, Some(45));
        assert_eq!(settings.command_timeout_secs, 60);
        assert_eq!(settings.catalog_url, DEFAULT_CATALOG_URL);
    }

    #[test]
    fn load_from_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().expect("temporary directory should be created");

        let settings = AppSettings::load_from(&dir.path().join("settings.json"))
            .expect("missing settings file should not be an error");

        assert_eq!(settings, AppSettings::default());
    }

    #[test]
    fn load_from_corrupt_file_reports_parse_error() {
        let dir = tempfile::tempdir().expect("temporary directory should be created");
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").expect("settings file should be written");

        let error = AppSettings::load_from(&path).expect_err("corrupt settings should fail");

        assert!(matches!(error, SettingsError::Parse { .. }));
    }

    #[test]
    fn fallback_notice_names_the_corrupt_file() {
        let dir = tempfile::tempdir().expect("temporary directory should be created");
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "\u{0}garbage{{").expect("settings file should be written");

        let error = AppSettings::load_from(&path).expect_err("corrupt settings should fail");
        let notice = error.fallback_notice();

        assert!(notice.starts_with("nodepin: ignoring settings, using defaults: "));
        assert!(notice.contains(&path.display().to_string()));
        assert!(notice.contains("is not valid settings JSON"));
    }

    #[test]
    fn nvm_timeouts_use_configured_seconds() {
        let settings = AppSettings {
            command_timeout_secs: 5,
            install_timeout_secs: 50,
            ..AppSettings::default()
        };

        let timeouts = settings.nvm_timeouts();

        assert_eq!(timeouts.command, Duration::from_secs(5));
        assert_eq!(timeouts.install, Duration::from_secs(50));
    }

    #[test]
    fn orchestrator_config_never_uses_zero_suggestion_limit() {
        let settings = AppSettings {
            suggestion_limit: 0,
            prompt_timeout_secs: Some(10),
            ..AppSettings::default()
        };

        let config = settings.orchestrator_config(true);

        assert_eq!(config.suggestion_limit, 1);
        assert_eq!(config.prompt_timeout, Some(Duration::from_secs(10)));
        assert!(config.assume_yes);
    }
}
