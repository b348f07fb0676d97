use std::time::Duration;

use async_trait::async_trait;
use dirhealth_doc_core::authority::Authority;
use dirhealth_doc_core::document::{Consensus, Vote};
use serde::de::DeserializeOwned;
use snafu::{ResultExt as _, ensure};
use tracing::debug;

use crate::{
    ClientSnafu, DecodeSnafu, DocumentFetcher, FetchResult, LOG_TARGET, RequestSnafu, Resource,
    StatusSnafu,
};

/// Fetches JSON renditions of the documents over plain HTTP
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(concat!("dirhealth/", env!("CARGO_PKG_VERSION")))
            .build()
            .context(ClientSnafu)?;

        Ok(Self { client })
    }

    async fn get<T>(&self, url: String) -> FetchResult<T>
    where
        T: DeserializeOwned,
    {
        debug!(target: LOG_TARGET, %url, "Fetching document");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .context(RequestSnafu { url: &url })?;

        let status = response.status();
        ensure!(status.is_success(), StatusSnafu { url, status });

        response.json().await.context(DecodeSnafu { url })
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch_consensus(&self, authority: &Authority) -> FetchResult<Consensus> {
        self.get(self.url(authority, &Resource::Consensus)).await
    }

    async fn fetch_vote(&self, authority: &Authority, resource: &Resource) -> FetchResult<Vote> {
        self.get(self.url(authority, resource)).await
    }
}
