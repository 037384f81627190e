//! AzureBlobStore - Blob コンテナ
//!
//! 画像はファイル名をそのまま Blob 名にして `image/jpeg` でアップロードします。

use async_trait::async_trait;
use azure_storage::StorageCredentials;
use azure_storage_blobs::prelude::{BlobServiceClient, ContainerClient};
use bytes::Bytes;

use super::{ignore_already_exists, ignore_not_found, service_error};
use crate::domain::{ServiceError, ServiceKind};
use crate::ports::BlobStore;

const IMAGE_CONTENT_TYPE: &str = "image/jpeg";

pub struct AzureBlobStore {
    name: String,
    container: ContainerClient,
}

impl AzureBlobStore {
    pub fn new(account: &str, credentials: StorageCredentials, container: &str) -> Self {
        let service = BlobServiceClient::new(account.to_string(), credentials);
        Self {
            name: container.to_string(),
            container: service.container_client(container),
        }
    }
}

#[async_trait]
impl BlobStore for AzureBlobStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn create_if_not_exists(&self) -> Result<(), ServiceError> {
        let result = self.container.create().await.map(|_| ());
        ignore_already_exists(ServiceKind::Blob, result)
    }

    async fn upload(&self, blob_name: &str, content: Bytes) -> Result<(), ServiceError> {
        self.container
            .blob_client(blob_name)
            .put_block_blob(content)
            .content_type(IMAGE_CONTENT_TYPE)
            .await
            .map(|_| ())
            .map_err(|e| service_error(ServiceKind::Blob, e))
    }

    async fn exists(&self, blob_name: &str) -> Result<bool, ServiceError> {
        self.container
            .blob_client(blob_name)
            .exists()
            .await
            .map_err(|e| service_error(ServiceKind::Blob, e))
    }

    async fn delete_if_exists(&self) -> Result<(), ServiceError> {
        let result = self.container.delete().await.map(|_| ());
        ignore_not_found(ServiceKind::Blob, result)
    }
}
