use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StorageResult;
use crate::file::BlobFile;
use crate::util;

pub const DEFAULT_MODE: &str = "rb";

/// The method surface a pluggable storage backend must implement for the
/// host application to treat it uniformly.
///
/// `open` and `save` are provided: they normalize the name and delegate to
/// the `open_blob` / `save_blob` hooks a backend overrides.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn open_blob<'a>(&'a self, name: &str, mode: &str) -> StorageResult<BlobFile<'a>>;

    /// Stores `content` under exactly `name` and returns the stored name.
    async fn save_blob(&self, name: &str, content: Bytes) -> StorageResult<String>;

    async fn delete(&self, name: &str) -> StorageResult<()>;

    async fn exists(&self, name: &str) -> StorageResult<bool>;

    /// Lists the directories and files directly under `path`.
    async fn listdir(&self, path: &str) -> StorageResult<(Vec<String>, Vec<String>)>;

    async fn size(&self, name: &str) -> StorageResult<u64>;

    async fn url(&self, name: &str) -> StorageResult<String>;

    async fn open<'a>(&'a self, name: &str, mode: &str) -> StorageResult<BlobFile<'a>> {
        let name = util::clean_name(name)?;

        self.open_blob(&name, mode).await
    }

    /// Saves under a collision-free variant of `name` and returns the name
    /// the content was actually stored under.
    async fn save(&self, name: &str, content: Bytes) -> StorageResult<String> {
        let name = util::clean_name(name)?;
        let name = self.get_available_name(&name).await?;

        self.save_blob(&name, content).await
    }

    async fn get_available_name(&self, name: &str) -> StorageResult<String> {
        let mut candidate = name.to_string();
        while self.exists(&candidate).await? {
            candidate = util::get_alternative_name(name);
        }

        Ok(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::adapters::mock::MockClient;
    use crate::error::StorageError;

    /// Records every hook invocation so the provided wrappers can be checked
    /// for exact delegation.
    struct RecordingStorage {
        client: MockClient,
        calls: Mutex<Vec<String>>,
        existing: Vec<String>,
    }

    impl RecordingStorage {
        fn new() -> Self {
            Self {
                client: MockClient::new(),
                calls: Mutex::new(Vec::new()),
                existing: Vec::new(),
            }
        }

        fn with_existing(names: Vec<&str>) -> Self {
            let mut storage = Self::new();
            storage.existing = names.into_iter().map(String::from).collect();
            storage
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Storage for RecordingStorage {
        async fn open_blob<'a>(&'a self, name: &str, mode: &str) -> StorageResult<BlobFile<'a>> {
            self.record(format!("open_blob({}, {})", name, mode));
            Ok(BlobFile::new(&self.client, name, mode))
        }

        async fn save_blob(&self, name: &str, content: Bytes) -> StorageResult<String> {
            self.record(format!("save_blob({}, {} bytes)", name, content.len()));
            Ok(name.to_string())
        }

        async fn delete(&self, name: &str) -> StorageResult<()> {
            self.record(format!("delete({})", name));
            Ok(())
        }

        async fn exists(&self, name: &str) -> StorageResult<bool> {
            self.record(format!("exists({})", name));
            Ok(self.existing.iter().any(|n| n == name))
        }

        async fn listdir(&self, path: &str) -> StorageResult<(Vec<String>, Vec<String>)> {
            self.record(format!("listdir({})", path));
            Ok((Vec::new(), Vec::new()))
        }

        async fn size(&self, name: &str) -> StorageResult<u64> {
            self.record(format!("size({})", name));
            Ok(0)
        }

        async fn url(&self, name: &str) -> StorageResult<String> {
            self.record(format!("url({})", name));
            Ok(String::new())
        }
    }

    #[tokio::test]
    async fn test_open_delegates_to_open_blob() {
        let storage = RecordingStorage::new();

        storage.open("f.txt", DEFAULT_MODE).await.unwrap();

        assert_eq!(storage.calls(), vec!["open_blob(f.txt, rb)".to_string()]);
    }

    #[tokio::test]
    async fn test_open_cleans_the_name() {
        let storage = RecordingStorage::new();

        storage.open("dir/./f.txt", "wb").await.unwrap();

        assert_eq!(storage.calls(), vec!["open_blob(dir/f.txt, wb)".to_string()]);
    }

    #[tokio::test]
    async fn test_save_delegates_to_save_blob() {
        let storage = RecordingStorage::new();

        let name = storage
            .save("f.txt", Bytes::from_static(b"hello"))
            .await
            .unwrap();

        assert_eq!(name, "f.txt");
        assert_eq!(
            storage.calls(),
            vec![
                "exists(f.txt)".to_string(),
                "save_blob(f.txt, 5 bytes)".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_save_rejects_escaping_names() {
        let storage = RecordingStorage::new();

        let result = storage.save("../f.txt", Bytes::new()).await;

        assert!(matches!(result, Err(StorageError::Suspicious(_))));
        assert!(storage.calls().is_empty());
    }

    #[tokio::test]
    async fn test_get_available_name_skips_taken_names() {
        let storage = RecordingStorage::with_existing(vec!["f.txt"]);

        let name = storage.get_available_name("f.txt").await.unwrap();

        assert_ne!(name, "f.txt");
        assert!(name.starts_with("f_"));
        assert!(name.ends_with(".txt"));
    }

    #[tokio::test]
    async fn test_get_available_name_keeps_free_names() {
        let storage = RecordingStorage::new();

        let name = storage.get_available_name("free.txt").await.unwrap();

        assert_eq!(name, "free.txt");
    }
}
