use async_trait::async_trait;

use nodepin_core::{CatalogError, ReleaseRecord, fetch_release_catalog};

/// Where the list of published releases comes from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<ReleaseRecord>, CatalogError>;
}

pub struct HttpCatalog {
    client: reqwest::Client,
    url: String,
}

impl HttpCatalog {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    async fn fetch(&self) -> Result<Vec<ReleaseRecord>, CatalogError> {
        fetch_release_catalog(&self.client, &self.url).await
    }
}
