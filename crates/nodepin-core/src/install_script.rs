use std::path::Path;
use std::time::Duration;

use log::{debug, info};
use sha2::{Digest, Sha256};

const INSTALL_SCRIPT_TIMEOUT: Duration = Duration::from_secs(30);
const INSTALL_SCRIPT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const INSTALL_SCRIPT_RETRY_DELAYS_SECS: [u64; 3] = [0, 2, 5];

#[derive(Debug, thiserror::Error)]
pub enum InstallScriptError {
    #[error("failed to build installer download client: {0}")]
    ClientBuild(reqwest::Error),
    #[error("failed to download installer script from {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("installer script download failed with HTTP {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("installer script checksum mismatch: expected {expected_sha256}, got {actual_sha256}")]
    ChecksumMismatch {
        expected_sha256: String,
        actual_sha256: String,
    },
    #[error("failed to write installer script to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Download an installer script to `path` and return its SHA-256 digest.
///
/// When `expected_sha256` is set the script is only written if it matches.
/// Without a pin the digest is logged so the operator can audit what ran.
///
/// # Errors
/// Returns an error if the HTTP request fails, the server responds with a
/// non-success status, a pinned checksum does not match, or writing the
/// script to disk fails.
pub async fn download_install_script(
    url: &str,
    expected_sha256: Option<&str>,
    path: &Path,
) -> Result<String, InstallScriptError> {
    let client = reqwest::Client::builder()
        .timeout(INSTALL_SCRIPT_TIMEOUT)
        .connect_timeout(INSTALL_SCRIPT_CONNECT_TIMEOUT)
        .user_agent(format!("nodepin/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(InstallScriptError::ClientBuild)?;

    let script = download_with_retries(&client, url).await?;
    let actual_sha256 = sha256_hex(&script);

    match expected_sha256 {
        Some(expected) => verify_checksum(&actual_sha256, expected)?,
        None => info!("Installer script from {url} has sha256 {actual_sha256} (not pinned)"),
    }

    tokio::fs::write(path, &script)
        .await
        .map_err(|source| InstallScriptError::Write {
            path: path.display().to_string(),
            source,
        })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700));
    }

    Ok(actual_sha256)
}

async fn download_with_retries(
    client: &reqwest::Client,
    url: &str,
) -> Result<Vec<u8>, InstallScriptError> {
    let mut last_error = None;

    for (attempt, delay_secs) in INSTALL_SCRIPT_RETRY_DELAYS_SECS.into_iter().enumerate() {
        if delay_secs > 0 {
            tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        }

        match download_once(client, url).await {
            Ok(bytes) => return Ok(bytes),
            Err(error) => {
                debug!("installer download attempt {} failed: {error}", attempt + 1);
                last_error = Some(error);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| InstallScriptError::Status {
        url: url.to_string(),
        status: reqwest::StatusCode::REQUEST_TIMEOUT,
    }))
}

async fn download_once(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, InstallScriptError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| InstallScriptError::Request {
            url: url.to_string(),
            source,
        })?;

    if !response.status().is_success() {
        return Err(InstallScriptError::Status {
            url: url.to_string(),
            status: response.status(),
        });
    }

    response
        .bytes()
        .await
        .map(|bytes| bytes.to_vec())
        .map_err(|source| InstallScriptError::Request {
            url: url.to_string(),
            source,
        })
}

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

fn verify_checksum(actual_sha256: &str, expected_sha256: &str) -> Result<(), InstallScriptError> {
    if actual_sha256.eq_ignore_ascii_case(expected_sha256.trim()) {
        return Ok(());
    }

    Err(InstallScriptError::ChecksumMismatch {
        expected_sha256: expected_sha256.trim().to_ascii_lowercase(),
        actual_sha256: actual_sha256.to_string(),
    })
}
