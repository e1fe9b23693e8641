use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::BackendError;

#[derive(Debug, Clone, Default)]
pub struct BackendDetection {
    pub found: bool,
    pub path: Option<PathBuf>,
    pub version: Option<String>,
    pub data_dir: Option<PathBuf>,
}

/// How to get the version manager onto this machine when it is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallGuidance {
    pub summary: String,
    pub command: Option<String>,
    pub url: &'static str,
}

#[async_trait]
pub trait BackendProvider: Send + Sync {
    fn name(&self) -> &'static str;
    fn display_name(&self) -> &'static str;
    async fn detect(&self) -> BackendDetection;
    fn install_guidance(&self) -> InstallGuidance;
    async fn install_backend(&self) -> Result<(), BackendError>;
    fn create_manager(&self, detection: &BackendDetection) -> Box<dyn VersionManager>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ManagerCapabilities {
    /// Activation outlives the child process that performed it (a global
    /// symlink rather than a per-shell `PATH` edit), so the active version
    /// can be read back afterwards.
    pub persistent_activation: bool,
}

#[derive(Debug, Clone)]
pub struct BackendInfo {
    pub name: &'static str,
    pub path: PathBuf,
    pub version: Option<String>,
    pub data_dir: Option<PathBuf>,
}

/// Result of asking the manager to activate a version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UseOutcome {
    Activated,
    NotInstalled,
    Failed(String),
}

#[async_trait]
pub trait VersionManager: Send + Sync {
    fn name(&self) -> &'static str;

    fn capabilities(&self) -> ManagerCapabilities;

    fn backend_info(&self) -> &BackendInfo;

    /// Normalized active version, or `None` when nothing (or only a system
    /// runtime) is active.
    async fn current_version(&self) -> Result<Option<String>, BackendError>;

    async fn use_version(&self, version: &str) -> Result<UseOutcome, BackendError>;

    async fn install(&self, version: &str) -> Result<(), BackendError>;

    /// Free-text listing of installed versions, for diagnostics only.
    async fn list_installed(&self) -> Result<String, BackendError> {
        Err(BackendError::Unsupported {
            operation: "list_installed",
        })
    }
}

impl<T: VersionManager + 'static> From<T> for Box<dyn VersionManager> {
    fn from(manager: T) -> Self {
        Box::new(manager)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    struct MockManager {
        info: BackendInfo,
        installed: Mutex<Vec<String>>,
    }

    impl MockManager {
        fn new(installed: &[&str]) -> Self {
            Self {
                info: BackendInfo {
                    name: "mock",
                    path: PathBuf::from("/tmp/mock-backend"),
                    version: Some("1.0.0".to_string()),
                    data_dir: Some(PathBuf::from("/tmp/mock-data")),
                },
                installed: Mutex::new(installed.iter().map(ToString::to_string).collect()),
            }
        }
    }

    #[async_trait]
    impl VersionManager for MockManager {
        fn name(&self) -> &'static str {
            "mock"
        }

        fn capabilities(&self) -> ManagerCapabilities {
            ManagerCapabilities::default()
        }

        fn backend_info(&self) -> &BackendInfo {
            &self.info
        }

        async fn current_version(&self) -> Result<Option<String>, BackendError> {
            Ok(None)
        }

        async fn use_version(&self, version: &str) -> Result<UseOutcome, BackendError> {
            let installed = self.installed.lock().expect("mock lock");
            if installed.iter().any(|v| v == version) {
                Ok(UseOutcome::Activated)
            } else {
                Ok(UseOutcome::NotInstalled)
            }
        }

        async fn install(&self, version: &str) -> Result<(), BackendError> {
            self.installed
                .lock()
                .expect("mock lock")
                .push(version.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn list_installed_default_returns_unsupported() {
        let manager = MockManager::new(&[]);

        let result = manager.list_installed().await;

        assert_eq!(
            result,
            Err(BackendError::Unsupported {
                operation: "list_installed"
            })
        );
    }

    #[tokio::test]
    async fn boxed_manager_reports_not_installed_until_installed() {
        let boxed: Box<dyn VersionManager> = MockManager::new(&["20.11.0"]).into();

        assert_eq!(
            boxed.use_version("20.11.0").await,
            Ok(UseOutcome::Activated)
        );
        assert_eq!(
            boxed.use_version("22.1.0").await,
            Ok(UseOutcome::NotInstalled)
        );

        boxed.install("22.1.0").await.expect("mock install");

        assert_eq!(
            boxed.use_version("22.1.0").await,
            Ok(UseOutcome::Activated)
        );
        assert_eq!(
            boxed.backend_info().path,
            PathBuf::from("/tmp/mock-backend")
        );
    }

    #[test]
    fn default_capabilities_are_not_persistent() {
        assert!(!ManagerCapabilities::default().persistent_activation);
    }
}
