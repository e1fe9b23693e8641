use std::path::PathBuf;

use nodepin_backend::{BackendError, VersionParseError};
use nodepin_core::{CatalogError, SuggestError};

/// Why a reconciliation run ended without a matching version.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    #[error("No version declaration found at {}", path.display())]
    DeclarationMissing { path: PathBuf },

    #[error("{} is empty", path.display())]
    DeclarationEmpty { path: PathBuf },

    #[error("{} does not contain a usable version: {source}", path.display())]
    DeclarationInvalid {
        path: PathBuf,
        source: VersionParseError,
    },

    #[error("Version manager unavailable: {details}")]
    ManagerUnavailable { details: String },

    #[error("Node.js {version} is still not installed")]
    VersionNotInstalled { version: String },

    #[error("Could not switch to Node.js {version}: {details}")]
    SwitchFailed { version: String, details: String },

    #[error("Installing Node.js {version} failed: {details}")]
    InstallFailed { version: String, details: String },

    #[error("Could not fetch the release catalog: {details}")]
    NetworkError { details: String },

    #[error("Release catalog is malformed: {details}")]
    CatalogParseError { details: String },

    #[error("Release catalog is empty")]
    EmptyCatalogError,

    #[error("Aborted at {step}")]
    UserAborted { step: &'static str },

    #[error("Node.js {version} was already tried in this run")]
    RepeatedVersion { version: String },

    #[error("{operation} timed out after {seconds}s")]
    Timeout {
        operation: &'static str,
        seconds: u64,
    },

    #[error("Failed to {operation}: {message}")]
    Io {
        operation: &'static str,
        kind: std::io::ErrorKind,
        message: String,
    },
}

impl AppError {
    pub fn timeout(operation: &'static str, seconds: u64) -> Self {
        Self::Timeout { operation, seconds }
    }

    pub fn user_aborted(step: &'static str) -> Self {
        Self::UserAborted { step }
    }

    pub fn io(operation: &'static str, error: &std::io::Error) -> Self {
        Self::Io {
            operation,
            kind: error.kind(),
            message: error.to_string(),
        }
    }

    pub fn install_failed(version: impl Into<String>, error: &BackendError) -> Self {
        Self::InstallFailed {
            version: version.into(),
            details: error.to_string(),
        }
    }

    pub fn switch_failed(version: impl Into<String>, details: impl Into<String>) -> Self {
        Self::SwitchFailed {
            version: version.into(),
            details: details.into(),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::Network { .. } | CatalogError::Status { .. } => Self::NetworkError {
                details: error.to_string(),
            },
            CatalogError::Parse(details) => Self::CatalogParseError { details },
        }
    }
}

impl From<SuggestError> for AppError {
    fn from(error: SuggestError) -> Self {
        match error {
            SuggestError::EmptyCatalog => Self::EmptyCatalogError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_parse_error_maps_to_parse_kind() {
        let mapped = AppError::from(CatalogError::Parse("missing field `date`".to_string()));

        assert_eq!(
            mapped,
            AppError::CatalogParseError {
                details: "missing field `date`".to_string()
            }
        );
    }

    #[test]
    fn catalog_network_error_maps_to_network_kind() {
        let mapped = AppError::from(CatalogError::Network {
            url: "https://nodejs.org/dist/index.json".to_string(),
            details: "connection refused".to_string(),
        });

        assert!(
            matches!(mapped, AppError::NetworkError { ref details } if details.contains("connection refused"))
        );
    }

    #[test]
    fn empty_catalog_maps_to_empty_catalog_kind() {
        assert_eq!(
            AppError::from(SuggestError::EmptyCatalog),
            AppError::EmptyCatalogError
        );
    }

    #[test]
    fn declaration_errors_name_the_file() {
        let error = AppError::DeclarationMissing {
            path: PathBuf::from(".nvmrc"),
        };

        assert_eq!(error.to_string(), "No version declaration found at .nvmrc");
    }

    #[test]
    fn timeout_display_includes_operation_and_duration() {
        assert_eq!(
            AppError::timeout("release catalog fetch", 30).to_string(),
            "release catalog fetch timed out after 30s"
        );
    }

    #[test]
    fn install_failed_carries_backend_message() {
        let error = AppError::install_failed(
            "99.0.0",
            &BackendError::install_failed("nvm install", "Version '99.0.0' not found"),
        );

        assert_eq!(
            error.to_string(),
            "Installing Node.js 99.0.0 failed: Installation failed during nvm install: Version '99.0.0' not found"
        );
    }
}
