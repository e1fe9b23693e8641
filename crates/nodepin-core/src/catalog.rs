use std::cmp::Ordering;

use log::debug;
use nodepin_backend::{compare, parse_version};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CATALOG_URL: &str = "https://nodejs.org/dist/index.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LtsStatus {
    NotLts,
    Codename(String),
    /// Marked LTS without a codename.
    Flagged,
}

impl LtsStatus {
    #[must_use]
    pub fn is_lts(&self) -> bool {
        !matches!(self, Self::NotLts)
    }

    #[must_use]
    pub fn codename(&self) -> Option<&str> {
        match self {
            Self::Codename(name) => Some(name),
            Self::NotLts | Self::Flagged => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRecord {
    /// Normalized, e.g. `20.11.0`.
    pub version: String,
    /// As published, e.g. `v20.11.0`.
    pub version_label: String,
    pub release_date: String,
    pub lts: LtsStatus,
}

impl ReleaseRecord {
    #[must_use]
    pub fn is_lts(&self) -> bool {
        self.lts.is_lts()
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to fetch release catalog from {url}: {details}")]
    Network { url: String, details: String },
    #[error("release catalog request to {url} failed with HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("failed to parse release catalog: {0}")]
    Parse(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLts {
    Flag(bool),
    Codename(String),
}

#[derive(Deserialize)]
struct RawRelease {
    version: String,
    date: String,
    lts: RawLts,
}

impl TryFrom<RawRelease> for ReleaseRecord {
    type Error = CatalogError;

    fn try_from(raw: RawRelease) -> Result<Self, Self::Error> {
        let version = parse_version(&raw.version)
            .map_err(|e| CatalogError::Parse(format!("release entry {}: {e}", raw.version)))?;
        let lts = match raw.lts {
            RawLts::Flag(false) => LtsStatus::NotLts,
            RawLts::Flag(true) => LtsStatus::Flagged,
            RawLts::Codename(name) if name.trim().is_empty() => LtsStatus::NotLts,
            RawLts::Codename(name) => LtsStatus::Codename(name),
        };

        Ok(Self {
            version,
            version_label: raw.version,
            release_date: raw.date,
            lts,
        })
    }
}

/// Parse a release index body into validated records, in source order.
///
/// # Errors
/// Returns [`CatalogError::Parse`] when the body is not a JSON array of
/// release objects, an entry lacks `version`, `date` or `lts`, or a version
/// is not dotted-numeric.
pub fn parse_release_catalog(body: &str) -> Result<Vec<ReleaseRecord>, CatalogError> {
    let raw: Vec<RawRelease> =
        serde_json::from_str(body).map_err(|e| CatalogError::Parse(e.to_string()))?;

    raw.into_iter().map(ReleaseRecord::try_from).collect()
}

/// Fetch and validate the remote release catalog. The catalog is never
/// cached; every call performs one request.
///
/// # Errors
/// Returns [`CatalogError::Network`] or [`CatalogError::Status`] when the
/// request fails, and [`CatalogError::Parse`] when the body is malformed.
pub async fn fetch_release_catalog(
    client: &reqwest::Client,
    url: &str,
) -> Result<Vec<ReleaseRecord>, CatalogError> {
    debug!("Fetching release catalog from {url}");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| CatalogError::Network {
            url: url.to_string(),
            details: e.to_string(),
        })?;

    if !response.status().is_success() {
        return Err(CatalogError::Status {
            url: url.to_string(),
            status: response.status(),
        });
    }

    let body = response.text().await.map_err(|e| CatalogError::Network {
        url: url.to_string(),
        details: e.to_string(),
    })?;

    let records = parse_release_catalog(&body)?;
    debug!("Release catalog contains {} entries", records.len());
    Ok(records)
}

/// Release records ordered newest first and unique by version.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<ReleaseRecord>,
}

impl Catalog {
    /// Sort descending by version. The sort is stable, so among duplicate
    /// versions the first one in source order is kept.
    #[must_use]
    pub fn from_records(records: &[ReleaseRecord]) -> Self {
        let mut records: Vec<ReleaseRecord> = records
            .iter()
            .cloned()
            .map(|mut record| {
                record.version = nodepin_backend::normalize(&record.version);
                record
            })
            .collect();
        records.sort_by(|a, b| compare(&b.version, &a.version));
        records.dedup_by(|later, earlier| compare(&later.version, &earlier.version) == Ordering::Equal);

        Self { records }
    }

    #[must_use]
    pub fn records(&self) -> &[ReleaseRecord] {
        &self.records
    }

    #[must_use]
    pub fn latest(&self) -> Option<&ReleaseRecord> {
        self.records.first()
    }

    #[must_use]
    pub fn latest_lts(&self) -> Option<&ReleaseRecord> {
        self.records.iter().find(|r| r.is_lts())
    }

    /// Whether `version` is a published release; a leading `v` is ignored.
    #[must_use]
    pub fn contains(&self, version: &str) -> bool {
        let version = nodepin_backend::normalize(version);
        self.records
            .iter()
            .any(|r| compare(&r.version, &version) == Ordering::Equal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    const SAMPLE: &str = r#"[
        {"version":"v22.1.0","date":"2024-05-02","files":[],"npm":"10.7.0","lts":false,"security":false},
        {"version":"v20.11.0","date":"2024-01-09","files":[],"npm":"10.2.4","lts":"Iron","security":false},
        {"version":"v20.9.0","date":"2023-10-24","files":[],"npm":"10.1.0","lts":"Iron","security":false}
    ]"#;

    fn record(version: &str, lts: Option<&str>) -> ReleaseRecord {
        ReleaseRecord {
            version: version.trim_start_matches('v').to_string(),
            version_label: format!("v{}", version.trim_start_matches('v')),
            release_date: "2024-01-01".to_string(),
            lts: lts.map_or(LtsStatus::NotLts, |c| LtsStatus::Codename(c.to_string())),
        }
    }

    #[test]
    fn parse_release_catalog_keeps_label_and_normalizes_version() {
        let records = parse_release_catalog(SAMPLE).expect("sample catalog should parse");

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].version, "22.1.0");
        assert_eq!(records[0].version_label, "v22.1.0");
        assert_eq!(records[0].lts, LtsStatus::NotLts);
        assert_eq!(records[1].lts.codename(), Some("Iron"));
        assert_eq!(records[2].release_date, "2023-10-24");
    }

    #[test]
    fn parse_release_catalog_accepts_boolean_true_lts() {
        let records =
            parse_release_catalog(r#"[{"version":"v1.0.0","date":"2020-01-01","lts":true}]"#)
                .expect("boolean lts should parse");

        assert_eq!(records[0].lts, LtsStatus::Flagged);
        assert!(records[0].is_lts());
    }

    #[test]
    fn parse_release_catalog_rejects_missing_fields() {
        let result = parse_release_catalog(r#"[{"version":"v1.0.0","lts":false}]"#);
        assert!(matches!(result, Err(CatalogError::Parse(msg)) if msg.contains("date")));
    }

    #[test]
    fn parse_release_catalog_rejects_malformed_version() {
        let result =
            parse_release_catalog(r#"[{"version":"v1.x","date":"2020-01-01","lts":false}]"#);
        assert!(matches!(result, Err(CatalogError::Parse(msg)) if msg.contains("v1.x")));
    }

    #[test]
    fn parse_release_catalog_rejects_non_array_body() {
        let result = parse_release_catalog(r#"{"error":"rate limited"}"#);
        assert!(matches!(result, Err(CatalogError::Parse(_))));
    }

    #[test]
    fn catalog_sorts_descending_and_drops_duplicates() {
        let mut duplicate = record("20.11.0", None);
        duplicate.release_date = "later".to_string();
        let catalog = Catalog::from_records(&[
            record("18.19.0", Some("Hydrogen")),
            record("20.11.0", Some("Iron")),
            record("v20.9.0", Some("Iron")),
            duplicate,
            record("21.6.0", None),
        ]);

        let versions: Vec<&str> = catalog.records().iter().map(|r| r.version.as_str()).collect();
        assert_eq!(versions, vec!["21.6.0", "20.11.0", "20.9.0", "18.19.0"]);
        assert_eq!(catalog.records()[1].lts.codename(), Some("Iron"));
        assert_eq!(catalog.latest().map(|r| r.version.as_str()), Some("21.6.0"));
        assert_eq!(
            catalog.latest_lts().map(|r| r.version.as_str()),
            Some("20.11.0")
        );
        assert!(catalog.contains("v18.19.0"));
        assert!(!catalog.contains("19.0.0"));
    }

    #[tokio::test]
    async fn fetch_release_catalog_parses_successful_response() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/dist/index.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(SAMPLE)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/dist/index.json", server.url());
        let records = fetch_release_catalog(&client, &url)
            .await
            .expect("catalog fetch should succeed");

        mock.assert_async().await;
        assert_eq!(records.len(), 3);
    }

    #[tokio::test]
    async fn fetch_release_catalog_reports_http_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/dist/index.json")
            .with_status(503)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/dist/index.json", server.url());
        let result = fetch_release_catalog(&client, &url).await;

        assert!(matches!(
            result,
            Err(CatalogError::Status { status, .. }) if status.as_u16() == 503
        ));
    }

    #[tokio::test]
    async fn fetch_release_catalog_reports_parse_error_for_garbage_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/dist/index.json")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/dist/index.json", server.url());
        let result = fetch_release_catalog(&client, &url).await;

        assert!(matches!(result, Err(CatalogError::Parse(_))));
    }

    #[tokio::test]
    async fn fetch_release_catalog_reports_network_error() {
        let client = reqwest::Client::new();
        let result = fetch_release_catalog(&client, "http://127.0.0.1:9/index.json").await;

        assert!(matches!(result, Err(CatalogError::Network { .. })));
    }
}
