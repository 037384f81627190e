//! InMemoryBlobStore - 開発用の Blob コンテナ

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Mutex;

use crate::domain::{ServiceError, ServiceKind};
use crate::ports::BlobStore;

/// InMemoryBlobStore は 1 つのコンテナを HashMap で持つ
///
/// - `None` はコンテナが存在しない状態
/// - 存在しないコンテナへの upload は `ContainerNotFound`
pub struct InMemoryBlobStore {
    name: String,
    blobs: Mutex<Option<HashMap<String, Bytes>>>,
}

impl InMemoryBlobStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            blobs: Mutex::new(None),
        }
    }

    pub async fn get(&self, blob_name: &str) -> Option<Bytes> {
        let blobs = self.blobs.lock().await;
        blobs.as_ref().and_then(|b| b.get(blob_name).cloned())
    }

    pub async fn len(&self) -> usize {
        let blobs = self.blobs.lock().await;
        blobs.as_ref().map_or(0, HashMap::len)
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn create_if_not_exists(&self) -> Result<(), ServiceError> {
        let mut blobs = self.blobs.lock().await;
        if blobs.is_none() {
            *blobs = Some(HashMap::new());
        }
        Ok(())
    }

    async fn upload(&self, blob_name: &str, content: Bytes) -> Result<(), ServiceError> {
        let mut blobs = self.blobs.lock().await;
        let container = blobs.as_mut().ok_or_else(|| {
            ServiceError::not_found(ServiceKind::Blob, "ContainerNotFound", &self.name)
        })?;
        container.insert(blob_name.to_string(), content);
        Ok(())
    }

    async fn exists(&self, blob_name: &str) -> Result<bool, ServiceError> {
        let blobs = self.blobs.lock().await;
        Ok(blobs.as_ref().is_some_and(|b| b.contains_key(blob_name)))
    }

    async fn delete_if_exists(&self) -> Result<(), ServiceError> {
        *self.blobs.lock().await = None;
        Ok(())
    }
}
