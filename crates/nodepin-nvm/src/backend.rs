use async_trait::async_trait;
use log::{debug, info};

use nodepin_backend::{BackendError, BackendInfo, ManagerCapabilities, UseOutcome, VersionManager};

use crate::client::{NvmClient, NvmEnvironment};

#[derive(Debug, Clone)]
pub struct NvmBackend {
    info: BackendInfo,
    client: NvmClient,
}

impl NvmBackend {
    #[must_use]
    pub fn new(client: NvmClient, version: Option<String>) -> Self {
        let (path, data_dir) = match &client.environment {
            NvmEnvironment::Unix { nvm_dir } => (nvm_dir.join("nvm.sh"), Some(nvm_dir.clone())),
            NvmEnvironment::Windows { nvm_exe } => (
                nvm_exe.clone(),
                nvm_exe.parent().map(std::path::Path::to_path_buf),
            ),
        };

        Self {
            info: BackendInfo {
                name: "nvm",
                path,
                version,
                data_dir,
            },
            client,
        }
    }
}

#[async_trait]
impl VersionManager for NvmBackend {
    fn name(&self) -> &'static str {
        "nvm"
    }

    fn capabilities(&self) -> ManagerCapabilities {
        // nvm-windows repoints a global symlink; nvm-sh only edits PATH of
        // the shell it runs in.
        ManagerCapabilities {
            persistent_activation: self.client.is_windows(),
        }
    }

    fn backend_info(&self) -> &BackendInfo {
        &self.info
    }

    async fn current_version(&self) -> Result<Option<String>, BackendError> {
        debug!("nvm: getting current version");
        self.client.current().await
    }

    async fn use_version(&self, version: &str) -> Result<UseOutcome, BackendError> {
        info!("nvm: using version {version}");
        let outcome = self.client.use_version(version).await?;
        debug!("nvm: use {version} -> {outcome:?}");
        Ok(outcome)
    }

    async fn install(&self, version: &str) -> Result<(), BackendError> {
        info!("nvm: installing version {version}");
        self.client.install(version).await
    }

    async fn list_installed(&self) -> Result<String, BackendError> {
        debug!("nvm: listing installed versions");
        self.client.list_installed().await
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn unix_backend() -> NvmBackend {
        let client = NvmClient::unix(PathBuf::from("/home/user/.nvm"));
        NvmBackend::new(client, Some("0.40.1".to_string()))
    }

    fn windows_backend() -> NvmBackend {
        let client = NvmClient::windows(PathBuf::from("C:\\nvm\\nvm.exe"));
        NvmBackend::new(client, Some("1.1.12".to_string()))
    }

    #[test]
    fn unix_activation_is_not_persistent() {
        assert!(!unix_backend().capabilities().persistent_activation);
    }

    #[test]
    fn windows_activation_is_persistent() {
        assert!(windows_backend().capabilities().persistent_activation);
    }

    #[test]
    fn unix_backend_info_points_at_nvm_script() {
        let backend = unix_backend();
        let info = backend.backend_info();

        assert_eq!(info.name, "nvm");
        assert_eq!(info.path, PathBuf::from("/home/user/.nvm/nvm.sh"));
        assert_eq!(info.data_dir, Some(PathBuf::from("/home/user/.nvm")));
        assert_eq!(info.version.as_deref(), Some("0.40.1"));
    }

    #[test]
    fn windows_backend_info_points_at_executable() {
        let backend = windows_backend();

        assert_eq!(
            backend.backend_info().path,
            PathBuf::from("C:\\nvm\\nvm.exe")
        );
    }
}
