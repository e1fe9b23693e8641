use std::path::PathBuf;
use std::time::Duration;

use log::{debug, trace};
use tokio::process::Command;

use nodepin_backend::{BackendError, UseOutcome};
use nodepin_platform::HideWindow;

use crate::output::{check_install_output, classify_use_output, clean_output, parse_current};

#[derive(Debug, Clone)]
pub enum NvmEnvironment {
    Unix { nvm_dir: PathBuf },
    Windows { nvm_exe: PathBuf },
}

#[derive(Debug, Clone, Copy)]
pub struct NvmTimeouts {
    pub command: Duration,
    pub install: Duration,
}

impl Default for NvmTimeouts {
    fn default() -> Self {
        Self {
            command: Duration::from_secs(60),
            install: Duration::from_secs(600),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone)]
pub struct NvmClient {
    pub environment: NvmEnvironment,
    pub timeouts: NvmTimeouts,
}

impl NvmClient {
    #[must_use]
    pub fn unix(nvm_dir: PathBuf) -> Self {
        Self {
            environment: NvmEnvironment::Unix { nvm_dir },
            timeouts: NvmTimeouts::default(),
        }
    }

    #[must_use]
    pub fn windows(nvm_exe: PathBuf) -> Self {
        Self {
            environment: NvmEnvironment::Windows { nvm_exe },
            timeouts: NvmTimeouts::default(),
        }
    }

    #[must_use]
    pub fn with_timeouts(mut self, timeouts: NvmTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    #[must_use]
    pub fn is_windows(&self) -> bool {
        matches!(self.environment, NvmEnvironment::Windows { .. })
    }

    fn build_nvm_command(&self, nvm_args: &[&str]) -> Command {
        let mut cmd = match &self.environment {
            NvmEnvironment::Unix { nvm_dir } => {
                // nvm-sh is a shell function, so it has to be sourced first.
                let script = format!(
                    "export NVM_DIR=\"{}\"; [ -s \"$NVM_DIR/nvm.sh\" ] && \\. \"$NVM_DIR/nvm.sh\"; nvm \"$@\"",
                    nvm_dir.display(),
                );
                let mut cmd = Command::new("bash");
                cmd.args(["-c", &script, "bash"]);
                cmd.args(nvm_args);
                cmd
            }
            NvmEnvironment::Windows { nvm_exe } => {
                let mut cmd = Command::new(nvm_exe);
                cmd.args(nvm_args);
                cmd
            }
        };
        cmd.hide_window().plain_output().kill_on_drop(true);
        cmd
    }

    pub(crate) async fn run(
        &self,
        nvm_args: &[&str],
        timeout: Duration,
    ) -> Result<CommandOutput, BackendError> {
        let display = format!("nvm {}", nvm_args.join(" "));
        debug!("Running `{display}`");

        let output = tokio::time::timeout(timeout, self.build_nvm_command(nvm_args).output())
            .await
            .map_err(|_| BackendError::Timeout {
                command: display.clone(),
                seconds: timeout.as_secs(),
            })??;

        let result = CommandOutput {
            success: output.status.success(),
            stdout: clean_output(&String::from_utf8_lossy(&output.stdout)),
            stderr: clean_output(&String::from_utf8_lossy(&output.stderr)),
        };
        trace!(
            "`{display}` exited with {}; stdout: {:?}; stderr: {:?}",
            output.status, result.stdout, result.stderr
        );
        Ok(result)
    }

    async fn execute(&self, nvm_args: &[&str]) -> Result<String, BackendError> {
        let output = self.run(nvm_args, self.timeouts.command).await?;

        if output.success {
            Ok(output.stdout)
        } else {
            Err(BackendError::command_failed(
                format!("nvm {}", nvm_args.join(" ")),
                output.stderr,
            ))
        }
    }

    /// Free-text listing of installed versions.
    ///
    /// # Errors
    /// Returns an error if the listing command fails.
    pub async fn list_installed(&self) -> Result<String, BackendError> {
        let args: &[&str] = if self.is_windows() { &["list"] } else { &["ls", "--no-colors"] };
        self.execute(args).await
    }

    /// Return the currently active Node.js version.
    ///
    /// # Errors
    /// Returns an error if the command fails or the version output is invalid.
    pub async fn current(&self) -> Result<Option<String>, BackendError> {
        let output = self.execute(&["current"]).await?;
        parse_current(&output)
    }

    /// Install a Node.js version.
    ///
    /// # Errors
    /// Returns an error if the install command fails or reports failure.
    pub async fn install(&self, version: &str) -> Result<(), BackendError> {
        let output = self.run(&["install", version], self.timeouts.install).await?;
        check_install_output(output.success, &output.stdout, &output.stderr)
    }

    /// Activate a Node.js version.
    ///
    /// # Errors
    /// Returns an error only when nvm could not be run at all; a refusal from
    /// nvm is reported through the returned [`UseOutcome`].
    pub async fn use_version(&self, version: &str) -> Result<UseOutcome, BackendError> {
        let output = self.run(&["use", version], self.timeouts.command).await?;
        Ok(classify_use_output(
            output.success,
            &output.stdout,
            &output.stderr,
        ))
    }

    /// Return the installed `nvm` tool version string.
    ///
    /// # Errors
    /// Returns an error if querying the nvm version fails.
    pub async fn version(&self) -> Result<String, BackendError> {
        let args: &[&str] = if self.is_windows() { &["version"] } else { &["--version"] };
        let output = self.execute(args).await?;
        Ok(output.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_windows_returns_true_for_windows_environment() {
        let client = NvmClient::windows(PathBuf::from("C:\\nvm\\nvm.exe"));
        assert!(client.is_windows());
    }

    #[test]
    fn is_windows_returns_false_for_unix_environment() {
        let client = NvmClient::unix(PathBuf::from("/home/user/.nvm"));
        assert!(!client.is_windows());
    }

    #[test]
    fn unix_command_sources_nvm_script_and_forwards_args() {
        let client = NvmClient::unix(PathBuf::from("/home/user/.nvm"));
        let cmd = client.build_nvm_command(&["use", "18.0.0"]);
        let std_cmd = cmd.as_std();

        assert_eq!(std_cmd.get_program(), "bash");
        let args: Vec<String> = std_cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args[0], "-c");
        assert!(args[1].contains("export NVM_DIR=\"/home/user/.nvm\""));
        assert_eq!(&args[2..], ["bash", "use", "18.0.0"]);
    }

    #[test]
    fn windows_command_invokes_executable_directly() {
        let client = NvmClient::windows(PathBuf::from("C:\\nvm\\nvm.exe"));
        let cmd = client.build_nvm_command(&["current"]);
        let std_cmd = cmd.as_std();

        assert_eq!(std_cmd.get_program(), "C:\\nvm\\nvm.exe");
        let args: Vec<String> = std_cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args, ["current"]);
    }

    #[test]
    fn with_timeouts_overrides_defaults() {
        let client = NvmClient::unix(PathBuf::from("/home/user/.nvm")).with_timeouts(NvmTimeouts {
            command: Duration::from_secs(5),
            install: Duration::from_secs(50),
        });

        assert_eq!(client.timeouts.command, Duration::from_secs(5));
        assert_eq!(client.timeouts.install, Duration::from_secs(50));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn missing_nvm_script_surfaces_command_failure() {
        let dir = tempfile::tempdir().expect("temporary directory should be created");
        let client = NvmClient::unix(dir.path().to_path_buf());

        let result = client.current().await;

        assert!(matches!(result, Err(BackendError::CommandFailed { .. })));
    }
}
