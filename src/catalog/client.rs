//! Network seam for the catalog API and its reqwest implementation.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::StatusCode;
use reqwest::header::RETRY_AFTER;
use serde::de::DeserializeOwned;

use super::error::{DataError, Envelope};
use super::signer::RequestSigner;
use super::types::{CharacterBatch, CharacterDto, DataWrapper, ItemRef, SectionItem, SectionItemDto};

pub const DEFAULT_BASE_URL: &str = "https://gateway.marvel.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

const CHARACTERS_PATH: &str = "/v1/public/characters";

/// Everything the paging layer needs from the remote API.
///
/// Implementations never panic and never let transport or decoding failures
/// escape as anything other than a [`DataError`].
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// `GET /v1/public/characters?limit&offset`
    async fn characters(&self, offset: usize, limit: usize) -> Envelope<CharacterBatch>;

    /// `GET <item.resourceURI>`
    async fn section_item(&self, item: &ItemRef) -> Envelope<SectionItem>;
}

/// Catalog client over HTTPS with per-request signing.
pub struct MarvelClient {
    base_url: String,
    signer: RequestSigner,
    client: reqwest::Client,
}

impl MarvelClient {
    /// Creates a client. `timeout` applies to both connecting and the whole request.
    pub fn new(
        signer: RequestSigner,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            base_url,
            signer,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URIs are used as-is; anything else is treated as a path on `base_url`.
    fn resolve(&self, uri: &str) -> String {
        if uri.starts_with("http://") || uri.starts_with("https://") {
            uri.to_string()
        } else if uri.starts_with('/') {
            format!("{}{}", self.base_url, uri)
        } else {
            format!("{}/{}", self.base_url, uri)
        }
    }

    /// Signs and sends a GET, then decodes the body as `T`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Envelope<T> {
        // Fresh signature per call; concurrent calls may carry different timestamps.
        let signature = self.signer.sign();
        debug!("GET {url} {query:?}");

        let response = self
            .client
            .get(url)
            .query(query)
            .query(&signature.query_pairs()[..])
            .send()
            .await
            .map_err(|e| {
                let mapped = DataError::from_transport(&e);
                warn!("GET {url} failed: {e} -> {mapped:?}");
                mapped
            })?;

        let status = response.status();
        debug!("GET {url} -> {status}");

        if !status.is_success() {
            let retry_after = retry_after_secs(&response);
            let mapped = DataError::from_status(status.as_u16(), retry_after);
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Catalog API error: {} - {} -> {:?}", status, body, mapped);
            return Err(mapped);
        }

        let bytes = response.bytes().await.map_err(|e| {
            let mapped = DataError::from_transport(&e);
            warn!("Reading body of {url} failed: {e} -> {mapped:?}");
            mapped
        })?;

        serde_json::from_slice::<T>(&bytes).map_err(|e| {
            warn!("Decoding body of {url} failed: {e}");
            DataError::Serialization
        })
    }
}

fn retry_after_secs(response: &reqwest::Response) -> Option<u64> {
    if response.status() != StatusCode::TOO_MANY_REQUESTS {
        return None;
    }
    response
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

#[async_trait]
impl CatalogApi for MarvelClient {
    async fn characters(&self, offset: usize, limit: usize) -> Envelope<CharacterBatch> {
        let url = format!("{}{}", self.base_url, CHARACTERS_PATH);
        let query = [("limit", limit.to_string()), ("offset", offset.to_string())];
        let wrapper: DataWrapper<CharacterDto> = self.get_json(&url, &query).await?;
        Ok(CharacterBatch::from(wrapper))
    }

    async fn section_item(&self, item: &ItemRef) -> Envelope<SectionItem> {
        let url = self.resolve(&item.resource_uri);
        let wrapper: DataWrapper<SectionItemDto> = self.get_json(&url, &[]).await?;
        SectionItem::from_wrapper(wrapper)
    }
}
