use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::adapters::{
    self,
    vercel::{VercelClient, VercelConfig},
    Blob,
};
use crate::error::{StorageError, StorageResult};
use crate::file::BlobFile;
use crate::model;
use crate::storage::Storage;

/// Uploads above this size would need the multi-part protocol, which this
/// backend does not speak.
pub const MULTIPART_THRESHOLD: usize = 4 * 1024 * 1024;

/// Storage backend over the Vercel Blob API.
pub struct VercelStorage {
    client: Box<dyn Blob>,
}

impl VercelStorage {
    pub fn new(client: Box<dyn Blob>) -> Self {
        Self { client }
    }

    /// Wires up a backend from `BLOB_READ_WRITE_TOKEN`.
    pub fn from_env() -> StorageResult<Self> {
        let client = VercelClient::new(VercelConfig::from_env()?)?;

        Ok(Self::new(Box::new(client)))
    }

    /// Fetches the raw bytes of `name`.
    pub async fn download(&self, name: &str) -> StorageResult<Vec<u8>> {
        let meta = self.find_blob(name).await?;

        self.client.download(&meta.url).await
    }

    async fn find_blob(&self, name: &str) -> StorageResult<model::blob::BlobMeta> {
        adapters::find_blob(self.client.as_ref(), name)
            .await?
            .ok_or_else(|| StorageError::Configuration(format!("no entry for: {}", name)))
    }
}

/// Single-call upload below the size threshold; anything larger goes to the
/// chunked path, which always fails.
pub(crate) async fn upload(
    client: &dyn Blob,
    name: &str,
    body: Vec<u8>,
) -> StorageResult<model::blob::BlobMeta> {
    if body.len() > MULTIPART_THRESHOLD {
        return multipart_upload(client, name, body).await;
    }

    let options = model::blob::PutOptions {
        content_type: None,
        add_random_suffix: false,
    };

    client.put(name, body, &options).await
}

async fn multipart_upload(
    _client: &dyn Blob,
    name: &str,
    _body: Vec<u8>,
) -> StorageResult<model::blob::BlobMeta> {
    Err(StorageError::Unsupported(format!(
        "chunked upload of {}: bodies over {} bytes cannot be stored",
        name, MULTIPART_THRESHOLD
    )))
}

#[async_trait]
impl Storage for VercelStorage {
    async fn open_blob<'a>(&'a self, name: &str, mode: &str) -> StorageResult<BlobFile<'a>> {
        debug!(pathname = name, mode = mode, "open");

        Ok(BlobFile::new(self.client.as_ref(), name, mode))
    }

    async fn save_blob(&self, name: &str, content: Bytes) -> StorageResult<String> {
        debug!(pathname = name, bytes = content.len(), "save");

        let meta = upload(self.client.as_ref(), name, content.to_vec()).await?;

        Ok(meta.pathname)
    }

    async fn delete(&self, name: &str) -> StorageResult<()> {
        debug!(pathname = name, "delete");

        let meta = self.find_blob(name).await?;

        self.client.delete(&meta.url).await
    }

    /// Membership is checked by scanning the listing for an exact pathname;
    /// the `name` is matched against the whole store, and only the first
    /// listing page is covered.
    async fn exists(&self, name: &str) -> StorageResult<bool> {
        let found = adapters::find_blob(self.client.as_ref(), name).await?;

        Ok(found.is_some())
    }

    async fn listdir(&self, path: &str) -> StorageResult<(Vec<String>, Vec<String>)> {
        let prefix = if path.is_empty() || path.ends_with('/') {
            path.to_string()
        } else {
            format!("{}/", path)
        };

        let options = model::blob::ListOptions {
            prefix: if prefix.is_empty() {
                None
            } else {
                Some(prefix.clone())
            },
            limit: None,
            cursor: None,
        };
        let page = self.client.list(&options).await?;

        let mut dirs: Vec<String> = Vec::new();
        let mut files: Vec<String> = Vec::new();
        for blob in &page.blobs {
            let relative = match blob.pathname.strip_prefix(&prefix) {
                Some(rest) if !rest.is_empty() => rest,
                _ => continue,
            };

            match relative.split_once('/') {
                Some((dir, _)) => {
                    if !dirs.iter().any(|d| d == dir) {
                        dirs.push(dir.to_string());
                    }
                }
                None => files.push(relative.to_string()),
            }
        }

        dirs.sort();
        files.sort();

        Ok((dirs, files))
    }

    async fn size(&self, name: &str) -> StorageResult<u64> {
        let meta = self.find_blob(name).await?;

        Ok(meta.size)
    }

    async fn url(&self, name: &str) -> StorageResult<String> {
        let meta = self.find_blob(name).await?;

        Ok(meta.url)
    }
}
