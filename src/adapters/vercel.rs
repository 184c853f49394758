use std::env;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::adapters;
use crate::error::{StorageError, StorageResult};
use crate::model;

pub const DEFAULT_BASE_URL: &str = "https://blob.vercel-storage.com";
pub const TOKEN_ENV_VAR: &str = "BLOB_READ_WRITE_TOKEN";

const API_VERSION: &str = "7";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
pub struct VercelConfig {
    pub token: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl VercelConfig {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Reads the read-write token from the environment, the way the hosting
    /// platform injects it.
    pub fn from_env() -> StorageResult<Self> {
        let token = env::var(TOKEN_ENV_VAR).map_err(|_| {
            StorageError::Configuration(format!("{} is not set", TOKEN_ENV_VAR))
        })?;

        Ok(Self::new(&token))
    }
}

pub struct VercelClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl VercelClient {
    pub fn new(config: VercelConfig) -> StorageResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| StorageError::Network(format!("failed to build http client: {}", err)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token,
        })
    }
}

#[async_trait]
impl adapters::Blob for VercelClient {
    async fn put(
        &self,
        pathname: &str,
        body: Vec<u8>,
        options: &model::blob::PutOptions,
    ) -> StorageResult<model::blob::BlobMeta> {
        let target = format!("{}/{}", self.base_url, pathname);
        debug!(pathname = pathname, bytes = body.len(), "put blob");

        let mut req = self
            .http
            .put(&target)
            .bearer_auth(&self.token)
            .header("x-api-version", API_VERSION)
            .header(
                "x-add-random-suffix",
                if options.add_random_suffix { "1" } else { "0" },
            );

        if let Some(content_type) = &options.content_type {
            req = req.header("x-content-type", content_type);
        }

        let meta = req
            .body(body)
            .send()
            .await?
            .error_for_status()?
            .json::<model::blob::BlobMeta>()
            .await?;

        Ok(meta)
    }

    async fn list(
        &self,
        options: &model::blob::ListOptions,
    ) -> StorageResult<model::blob::BlobList> {
        debug!(prefix = options.prefix.as_deref().unwrap_or(""), "list blobs");

        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(prefix) = &options.prefix {
            query.push(("prefix", prefix.clone()));
        }
        if let Some(limit) = options.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(cursor) = &options.cursor {
            query.push(("cursor", cursor.clone()));
        }

        let list = self
            .http
            .get(&self.base_url)
            .bearer_auth(&self.token)
            .header("x-api-version", API_VERSION)
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .json::<model::blob::BlobList>()
            .await?;

        Ok(list)
    }

    async fn delete(&self, url: &str) -> StorageResult<()> {
        debug!(url = url, "delete blob");

        self.http
            .post(format!("{}/delete", self.base_url))
            .bearer_auth(&self.token)
            .header("x-api-version", API_VERSION)
            .json(&json!({ "urls": [url] }))
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    async fn download(&self, url: &str) -> StorageResult<Vec<u8>> {
        debug!(url = url, "download blob");

        let response = self.http.get(url).bearer_auth(&self.token).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Suspicious(format!(
                "fetching {} returned status {}",
                url, status
            )));
        }

        let bytes = response.bytes().await?;

        Ok(bytes.to_vec())
    }
}
