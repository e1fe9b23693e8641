use nodepin_backend::{BackendError, VersionParseError};

use crate::error::AppError;

/// One step of a reconciliation run. Versions carried here are normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    DeclarationMissing,
    DeclarationEmpty,
    DeclarationInvalid {
        raw: String,
        error: VersionParseError,
    },
    DeclarationReady {
        target: String,
    },
    ManagerUnavailable {
        target: String,
    },
    Comparing {
        target: String,
    },
    Switching {
        target: String,
        current: Option<String>,
    },
    PromptInstall {
        target: String,
        reason: String,
    },
    Installing {
        target: String,
    },
    Suggesting {
        target: String,
        /// Why installing `target` failed.
        failure: BackendError,
    },
    Resolved {
        version: String,
    },
    Aborted {
        reason: AppError,
    },
}

impl State {
    pub fn name(&self) -> &'static str {
        match self {
            Self::DeclarationMissing => "DeclarationMissing",
            Self::DeclarationEmpty => "DeclarationEmpty",
            Self::DeclarationInvalid { .. } => "DeclarationInvalid",
            Self::DeclarationReady { .. } => "DeclarationReady",
            Self::ManagerUnavailable { .. } => "ManagerUnavailable",
            Self::Comparing { .. } => "Comparing",
            Self::Switching { .. } => "Switching",
            Self::PromptInstall { .. } => "PromptInstall",
            Self::Installing { .. } => "Installing",
            Self::Suggesting { .. } => "Suggesting",
            Self::Resolved { .. } => "Resolved",
            Self::Aborted { .. } => "Aborted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved { .. } | Self::Aborted { .. })
    }
}

#[derive(Debug)]
pub struct Outcome {
    pub state: State,
    /// Names of every state visited, in order.
    pub history: Vec<&'static str>,
}

impl Outcome {
    pub fn exit_code(&self) -> u8 {
        match self.state {
            State::Resolved { .. } => 0,
            _ => 1,
        }
    }

    #[cfg(test)]
    pub fn abort_reason(&self) -> Option<&AppError> {
        match &self.state {
            State::Aborted { reason } => Some(reason),
            _ => None,
        }
    }
}
