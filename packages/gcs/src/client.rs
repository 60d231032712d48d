//! [`ObjectStore`] over the GCS JSON API with a blocking reqwest client.
//!
//! ## Requests
//!
//! - list: `GET {endpoint}/storage/v1/b/{bucket}/o?prefix=..&pageToken=..&maxResults=..`
//! - download handle: `{endpoint}/download/storage/v1/b/{bucket}/o/{key}?alt=media`
//!   (no request is made to build it)
//! - fetch: one `GET` of the download handle
//!
//! Bucket and key are percent-encoded as single path segments, so a key's
//! `/` travels as `%2F`. No retries; any non-2xx answer is returned as
//! [`ObjectAccessError::Status`].

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use bytes::Bytes;

use crate::config::GcsConfig;
use crate::error::{Error, ObjectAccessError};
use crate::store::{DownloadHandle, ObjectPage, ObjectStore};
use crate::types::ListObjectsResponse;

/// Blocking GCS client.
///
/// Cheap to share: wrap it in an `Arc` once and hand that to every path.
///
/// ```ignore
/// use std::sync::Arc;
/// use remotepath_gcs::{GcsClient, GcsConfig, GcsPath};
///
/// let client = Arc::new(GcsClient::from_config(&GcsConfig::from_env()?)?);
/// let path = GcsPath::parse("gs://bucket/dir/tile.tif", client)?;
/// let reader = path.open()?;
/// ```
pub struct GcsClient {
    client: Client,
    endpoint: Url,
    page_size: Option<u32>,
}

impl GcsClient {
    /// A client for the public endpoint with default settings.
    pub fn new() -> Result<Self, Error> {
        Self::from_config(&GcsConfig::default())
    }

    pub fn from_config(config: &GcsConfig) -> Result<Self, Error> {
        config.validate()?;
        let endpoint = Url::parse(&config.endpoint)?;

        let mut headers = HeaderMap::new();
        for (name, value) in &config.default_headers {
            let header_name = HeaderName::try_from(name.as_str())?;
            let header_value = HeaderValue::try_from(value.as_str())?;
            headers.insert(header_name, header_value);
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()?;

        Self::with_client(client, endpoint, config.page_size)
    }

    /// Use a preconfigured reqwest client.
    pub fn with_client(client: Client, endpoint: Url, page_size: Option<u32>) -> Result<Self, Error> {
        if endpoint.cannot_be_a_base() {
            return Err(Error::Config {
                message: format!("endpoint {} cannot be a base URL", endpoint),
            });
        }

        Ok(Self {
            client,
            endpoint,
            page_size,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Append encoded path segments to the endpoint.
    fn build_url(&self, segments: &[&str]) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn get(&self, url: Url) -> Result<Response, Error> {
        log::debug!("GET {}", url);
        let response = self.client.get(url.clone()).send()?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(ObjectAccessError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                message,
            }
            .into());
        }

        Ok(response)
    }
}

impl ObjectStore for GcsClient {
    fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        page_token: Option<&str>,
    ) -> Result<ObjectPage, Error> {
        let mut query = Vec::new();
        if !prefix.is_empty() {
            query.push(("prefix", prefix.to_string()));
        }
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }
        if let Some(page_size) = self.page_size {
            query.push(("maxResults", page_size.to_string()));
        }

        let mut url = self.build_url(&["storage", "v1", "b", bucket, "o"]);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        let body = self.get(url)?.text()?;
        let listing: ListObjectsResponse =
            serde_json::from_str(&body).map_err(ObjectAccessError::from)?;

        Ok(ObjectPage {
            keys: listing.items.into_iter().map(|item| item.name).collect(),
            next_page_token: listing.next_page_token,
        })
    }

    fn download_handle(&self, bucket: &str, key: &str) -> Result<DownloadHandle, Error> {
        let mut url = self.build_url(&["download", "storage", "v1", "b", bucket, "o", key]);
        url.query_pairs_mut().append_pair("alt", "media");

        Ok(DownloadHandle {
            bucket: bucket.to_string(),
            key: key.to_string(),
            url: url.to_string(),
        })
    }

    fn fetch(&self, handle: &DownloadHandle) -> Result<Bytes, Error> {
        let url = Url::parse(&handle.url)?;
        let body = self.get(url)?.bytes()?;
        log::debug!(
            "fetched {} bytes of gs://{}/{}",
            body.len(),
            handle.bucket,
            handle.key
        );
        Ok(body)
    }
}
