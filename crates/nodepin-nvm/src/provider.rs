use async_trait::async_trait;
use std::path::PathBuf;

use nodepin_backend::{
    BackendDetection, BackendError, BackendProvider, InstallGuidance, VersionManager,
};

use crate::backend::NvmBackend;
use crate::client::{NvmClient, NvmTimeouts};
use crate::detection::{NvmVariant, detect_nvm, install_guidance, install_nvm};

pub struct NvmProvider {
    variant: std::sync::Mutex<NvmVariant>,
    nvm_dir: Option<PathBuf>,
    installer_sha256: Option<String>,
    timeouts: NvmTimeouts,
}

impl Default for NvmProvider {
    fn default() -> Self {
        Self {
            variant: std::sync::Mutex::new(NvmVariant::NotFound),
            nvm_dir: None,
            installer_sha256: None,
            timeouts: NvmTimeouts::default(),
        }
    }
}

impl NvmProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look for `nvm.sh` in `dir` before `$NVM_DIR` and the default locations.
    #[must_use]
    pub fn with_nvm_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.nvm_dir = dir;
        self
    }

    /// Refuse to run a downloaded installer whose digest differs from `sha256`.
    #[must_use]
    pub fn with_installer_sha256(mut self, sha256: Option<String>) -> Self {
        self.installer_sha256 = sha256;
        self
    }

    #[must_use]
    pub fn with_timeouts(mut self, timeouts: NvmTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    fn variant(&self) -> NvmVariant {
        *self
            .variant
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl BackendProvider for NvmProvider {
    fn name(&self) -> &'static str {
        "nvm"
    }

    fn display_name(&self) -> &'static str {
        "nvm (Node Version Manager)"
    }

    async fn detect(&self) -> BackendDetection {
        let detection = detect_nvm(self.nvm_dir.as_deref()).await;

        *self
            .variant
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = detection.variant;

        BackendDetection {
            found: detection.found,
            path: detection.nvm_exe.or_else(|| detection.nvm_dir.clone()),
            version: detection.version,
            data_dir: detection.nvm_dir,
        }
    }

    fn install_guidance(&self) -> InstallGuidance {
        install_guidance()
    }

    async fn install_backend(&self) -> Result<(), BackendError> {
        install_nvm(self.installer_sha256.as_deref()).await
    }

    fn create_manager(&self, detection: &BackendDetection) -> Box<dyn VersionManager> {
        let client = match (self.variant(), &detection.path) {
            (NvmVariant::Windows, Some(exe)) => NvmClient::windows(exe.clone()),
            _ => NvmClient::unix(
                detection
                    .data_dir
                    .clone()
                    .or_else(|| detection.path.clone())
                    .or_else(|| dirs::home_dir().map(|home| home.join(".nvm")))
                    .unwrap_or_else(|| PathBuf::from(".nvm")),
            ),
        }
        .with_timeouts(self.timeouts);

        Box::new(NvmBackend::new(client, detection.version.clone()))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use nodepin_backend::{BackendDetection, BackendProvider};

    use super::*;

    #[test]
    fn provider_metadata_is_stable() {
        let provider = NvmProvider::new();

        assert_eq!(provider.name(), "nvm");
        assert_eq!(provider.display_name(), "nvm (Node Version Manager)");
    }

    #[test]
    fn create_manager_uses_detection_data_dir_for_unix() {
        let provider = NvmProvider::new();
        let detection = BackendDetection {
            found: true,
            path: Some(PathBuf::from("/custom/.nvm")),
            version: Some("0.40.1".to_string()),
            data_dir: Some(PathBuf::from("/custom/.nvm")),
        };

        let manager = provider.create_manager(&detection);
        let info = manager.backend_info();

        assert_eq!(info.path, PathBuf::from("/custom/.nvm/nvm.sh"));
        assert_eq!(info.data_dir, Some(PathBuf::from("/custom/.nvm")));
        assert_eq!(info.version.as_deref(), Some("0.40.1"));
        assert!(!manager.capabilities().persistent_activation);
    }

    #[test]
    fn create_manager_uses_windows_executable_after_windows_detection() {
        let provider = NvmProvider::new().with_timeouts(NvmTimeouts {
            command: Duration::from_secs(1),
            install: Duration::from_secs(2),
        });
        *provider.variant.lock().expect("variant lock") = NvmVariant::Windows;
        let detection = BackendDetection {
            found: true,
            path: Some(PathBuf::from("C:\\nvm\\nvm.exe")),
            version: None,
            data_dir: None,
        };

        let manager = provider.create_manager(&detection);

        assert_eq!(
            manager.backend_info().path,
            PathBuf::from("C:\\nvm\\nvm.exe")
        );
        assert!(manager.capabilities().persistent_activation);
    }

    #[tokio::test]
    async fn detect_with_empty_override_and_no_install_reports_not_found() {
        let dir = tempfile::tempdir().expect("temporary directory should be created");
        let provider = NvmProvider::new().with_nvm_dir(Some(dir.path().to_path_buf()));

        let detection = provider.detect().await;

        // The machine running the tests may have nvm installed elsewhere.
        if detection.found {
            assert_ne!(detection.data_dir.as_deref(), Some(dir.path()));
        } else {
            assert!(detection.path.is_none());
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn detect_skips_override_whose_script_defines_no_nvm() {
        let dir = tempfile::tempdir().expect("temporary directory should be created");
        std::fs::write(dir.path().join("nvm.sh"), "true\n").expect("nvm.sh should be written");
        let provider = NvmProvider::new().with_nvm_dir(Some(dir.path().to_path_buf()));

        let detection = provider.detect().await;

        if detection.found {
            assert_ne!(detection.data_dir.as_deref(), Some(dir.path()));
        } else {
            assert!(detection.path.is_none());
            assert!(detection.version.is_none());
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn detect_reports_override_whose_nvm_answers() {
        let dir = tempfile::tempdir().expect("temporary directory should be created");
        std::fs::write(dir.path().join("nvm.sh"), "nvm() { echo \"0.40.1\"; }\n")
            .expect("nvm.sh should be written");
        let provider = NvmProvider::new().with_nvm_dir(Some(dir.path().to_path_buf()));

        let detection = provider.detect().await;

        assert!(detection.found);
        assert_eq!(detection.data_dir.as_deref(), Some(dir.path()));
        assert_eq!(detection.version.as_deref(), Some("0.40.1"));
    }
}
