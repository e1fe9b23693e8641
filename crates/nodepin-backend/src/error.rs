use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Version manager not found")]
    NotFound,

    #[error("`{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error(transparent)]
    ParseError(#[from] crate::version::VersionParseError),

    #[error("Installation failed during {phase}: {details}")]
    InstallFailed {
        phase: &'static str,
        details: String,
    },

    #[error("IO error ({kind}): {message}")]
    IoError {
        kind: std::io::ErrorKind,
        message: String,
    },

    #[error("Operation not supported by this backend: {operation}")]
    Unsupported { operation: &'static str },

    #[error("`{command}` did not finish within {seconds}s")]
    Timeout { command: String, seconds: u64 },
}

impl BackendError {
    pub fn command_failed(command: impl Into<String>, stderr: impl AsRef<str>) -> Self {
        Self::CommandFailed {
            command: command.into(),
            stderr: stderr.as_ref().trim().to_string(),
        }
    }

    pub fn install_failed(phase: &'static str, details: impl Into<String>) -> Self {
        Self::InstallFailed {
            phase,
            details: details.into(),
        }
    }

    pub fn install_failed_from<E>(phase: &'static str, error: E) -> Self
    where
        E: std::fmt::Display,
    {
        Self::install_failed(phase, error.to_string())
    }
}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        BackendError::IoError {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
