use async_trait::async_trait;

use crate::error::StorageResult;
use crate::model;

pub mod mock;
pub mod vercel;

/// The surface of the remote blob client the storage backend is written
/// against.
#[async_trait]
pub trait Blob: Send + Sync {
    async fn put(
        &self,
        pathname: &str,
        body: Vec<u8>,
        options: &model::blob::PutOptions,
    ) -> StorageResult<model::blob::BlobMeta>;

    async fn list(
        &self,
        options: &model::blob::ListOptions,
    ) -> StorageResult<model::blob::BlobList>;

    async fn delete(&self, url: &str) -> StorageResult<()>;

    async fn download(&self, url: &str) -> StorageResult<Vec<u8>>;
}

/// Resolves a stored name to its blob record by scanning one listing page.
///
/// The store has no lookup-by-name call, so this fetches a listing and scans
/// it. Only the service's default page size is covered; entries past the
/// first page are not found.
pub async fn find_blob(
    client: &dyn Blob,
    pathname: &str,
) -> StorageResult<Option<model::blob::BlobMeta>> {
    let page = client.list(&model::blob::ListOptions::default()).await?;

    Ok(page.blobs.into_iter().find(|blob| blob.pathname == pathname))
}
