use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info};
use tokio::process::Command;

use nodepin_backend::{BackendError, InstallGuidance};
use nodepin_platform::HideWindow;

use crate::client::NvmClient;

pub(crate) const NVM_INSTALL_SCRIPT_URL: &str =
    "https://raw.githubusercontent.com/nvm-sh/nvm/v0.40.1/install.sh";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NvmVariant {
    Unix,
    Windows,
    NotFound,
}

#[derive(Debug, Clone)]
pub struct NvmDetection {
    pub found: bool,
    pub nvm_dir: Option<PathBuf>,
    pub nvm_exe: Option<PathBuf>,
    pub version: Option<String>,
    pub variant: NvmVariant,
}

impl NvmDetection {
    fn not_found() -> Self {
        Self {
            found: false,
            nvm_dir: None,
            nvm_exe: None,
            version: None,
            variant: NvmVariant::NotFound,
        }
    }
}

pub(crate) async fn detect_nvm(dir_override: Option<&Path>) -> NvmDetection {
    if cfg!(windows) {
        return detect_nvm_windows().await;
    }

    let env_dir = std::env::var_os("NVM_DIR").map(PathBuf::from);
    for nvm_dir in nvm_dirs_with_script(dir_override, env_dir, nvm_dir_candidates()) {
        // A sourced nvm.sh that does not define `nvm` is a broken install.
        match NvmClient::unix(nvm_dir.clone()).version().await {
            Ok(version) => {
                debug!("Detected nvm {version} in {}", nvm_dir.display());
                return NvmDetection {
                    found: true,
                    nvm_dir: Some(nvm_dir),
                    nvm_exe: None,
                    version: Some(version),
                    variant: NvmVariant::Unix,
                };
            }
            Err(error) => debug!("Ignoring nvm in {}: {error}", nvm_dir.display()),
        }
    }

    debug!("No working nvm.sh found in any candidate directory");
    NvmDetection::not_found()
}

async fn detect_nvm_windows() -> NvmDetection {
    let from_home = std::env::var_os("NVM_HOME")
        .map(|home| PathBuf::from(home).join("nvm.exe"))
        .filter(|exe| exe.exists());
    let Some(nvm_exe) = which::which("nvm").ok().or(from_home) else {
        return NvmDetection::not_found();
    };

    let version = match NvmClient::windows(nvm_exe.clone()).version().await {
        Ok(version) => version,
        Err(error) => {
            debug!("Ignoring {}: {error}", nvm_exe.display());
            return NvmDetection::not_found();
        }
    };

    NvmDetection {
        found: true,
        nvm_dir: nvm_exe.parent().map(Path::to_path_buf),
        nvm_exe: Some(nvm_exe),
        version: Some(version),
        variant: NvmVariant::Windows,
    }
}

/// Directories holding an `nvm.sh`, in lookup order: an explicit override,
/// then `$NVM_DIR`, then the usual install locations.
fn nvm_dirs_with_script(
    dir_override: Option<&Path>,
    env_dir: Option<PathBuf>,
    candidates: Vec<PathBuf>,
) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();
    for dir in dir_override
        .map(Path::to_path_buf)
        .into_iter()
        .chain(env_dir)
        .chain(candidates)
    {
        if dir.join("nvm.sh").is_file() && !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }
    dirs
}

fn nvm_dir_candidates() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".nvm"));
    }

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        paths.push(PathBuf::from(xdg_config).join("nvm"));
    }

    #[cfg(target_os = "macos")]
    {
        paths.push(PathBuf::from("/opt/homebrew/opt/nvm"));
        paths.push(PathBuf::from("/usr/local/opt/nvm"));
    }

    paths
}

pub(crate) fn install_guidance() -> InstallGuidance {
    if cfg!(windows) {
        InstallGuidance {
            summary: "nvm-windows is not installed. Install it with winget or download nvm-setup.exe from the releases page.".to_string(),
            command: Some("winget install CoreyButler.NVMforWindows".to_string()),
            url: "https://github.com/coreybutler/nvm-windows/releases",
        }
    } else if cfg!(target_os = "macos") {
        InstallGuidance {
            summary: "nvm is not installed. Install it with the official script (Homebrew's `brew install nvm` also works).".to_string(),
            command: Some(format!("curl -o- {NVM_INSTALL_SCRIPT_URL} | bash")),
            url: "https://github.com/nvm-sh/nvm#installing-and-updating",
        }
    } else {
        InstallGuidance {
            summary: "nvm is not installed. Install it with the official script.".to_string(),
            command: Some(format!("curl -o- {NVM_INSTALL_SCRIPT_URL} | bash")),
            url: "https://github.com/nvm-sh/nvm#installing-and-updating",
        }
    }
}

pub(crate) async fn install_nvm(expected_sha256: Option<&str>) -> Result<(), BackendError> {
    if cfg!(windows) {
        // nvm-windows ships as a GUI installer.
        return Err(BackendError::Unsupported {
            operation: "automatic nvm-windows installation",
        });
    }

    let script_path = temp_script_path("nvm-install", "sh");
    let result = async {
        nodepin_core::download_install_script(NVM_INSTALL_SCRIPT_URL, expected_sha256, &script_path)
            .await
            .map_err(|e| BackendError::install_failed_from("download", e))?;

        info!("Running nvm install script");
        Command::new("bash")
            .arg(&script_path)
            .hide_window()
            .status()
            .await
            .map_err(BackendError::from)
    }
    .await;
    let _ = tokio::fs::remove_file(&script_path).await;

    if result?.success() {
        Ok(())
    } else {
        Err(BackendError::install_failed(
            "install script",
            "nvm installation script exited with an error",
        ))
    }
}

fn temp_script_path(prefix: &str, ext: &str) -> PathBuf {
    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    std::env::temp_dir().join(format!("{prefix}-{}-{nonce}.{ext}", std::process::id()))
}
