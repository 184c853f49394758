use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::adapters;
use crate::error::{StorageError, StorageResult};
use crate::model;

/// In-memory stand-in for the remote store, used by backend and file tests.
#[derive(Default)]
pub struct MockClient {
    blobs: Mutex<HashMap<String, (model::blob::BlobMeta, Vec<u8>)>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blobs(entries: Vec<(&str, &[u8])>) -> Self {
        let client = Self::new();
        {
            let mut blobs = client
                .blobs
                .lock()
                .expect("failed to acquire `blobs` guard");
            for (pathname, body) in entries {
                blobs.insert(
                    pathname.to_string(),
                    (Self::meta_for(pathname, body.len()), body.to_vec()),
                );
            }
        }

        client
    }

    pub fn contains(&self, pathname: &str) -> bool {
        self.blobs
            .lock()
            .expect("failed to acquire `blobs` guard")
            .contains_key(pathname)
    }

    pub fn body_of(&self, pathname: &str) -> Option<Vec<u8>> {
        self.blobs
            .lock()
            .expect("failed to acquire `blobs` guard")
            .get(pathname)
            .map(|(_, body)| body.clone())
    }

    fn meta_for(pathname: &str, size: usize) -> model::blob::BlobMeta {
        model::blob::BlobMeta {
            url: format!("https://mock.blob/{}", pathname),
            pathname: pathname.to_string(),
            size: size as u64,
            uploaded_at: Some(Utc::now()),
            content_disposition: format!("attachment; filename=\"{}\"", pathname),
            content_type: "application/octet-stream".to_string(),
        }
    }
}

#[async_trait]
impl adapters::Blob for MockClient {
    async fn put(
        &self,
        pathname: &str,
        body: Vec<u8>,
        options: &model::blob::PutOptions,
    ) -> StorageResult<model::blob::BlobMeta> {
        let mut meta = Self::meta_for(pathname, body.len());
        if let Some(content_type) = &options.content_type {
            meta.content_type = content_type.clone();
        }

        self.blobs
            .lock()
            .expect("failed to acquire `blobs` guard")
            .insert(pathname.to_string(), (meta.clone(), body));

        Ok(meta)
    }

    async fn list(
        &self,
        options: &model::blob::ListOptions,
    ) -> StorageResult<model::blob::BlobList> {
        let blobs = self
            .blobs
            .lock()
            .expect("failed to acquire `blobs` guard");

        let mut matched: Vec<model::blob::BlobMeta> = blobs
            .values()
            .filter(|(meta, _)| match &options.prefix {
                Some(prefix) => meta.pathname.starts_with(prefix.as_str()),
                None => true,
            })
            .map(|(meta, _)| meta.clone())
            .collect();
        matched.sort_by(|a, b| a.pathname.cmp(&b.pathname));

        let limit = options.limit.unwrap_or(1000) as usize;
        let has_more = matched.len() > limit;
        matched.truncate(limit);

        Ok(model::blob::BlobList {
            has_more,
            cursor: None,
            blobs: matched,
        })
    }

    async fn delete(&self, url: &str) -> StorageResult<()> {
        let mut blobs = self
            .blobs
            .lock()
            .expect("failed to acquire `blobs` guard");
        blobs.retain(|_, (meta, _)| meta.url != url);

        Ok(())
    }

    async fn download(&self, url: &str) -> StorageResult<Vec<u8>> {
        let blobs = self
            .blobs
            .lock()
            .expect("failed to acquire `blobs` guard");

        blobs
            .values()
            .find(|(meta, _)| meta.url == url)
            .map(|(_, body)| body.clone())
            .ok_or_else(|| {
                StorageError::Suspicious(format!("fetching {} returned status 404 Not Found", url))
            })
    }
}
