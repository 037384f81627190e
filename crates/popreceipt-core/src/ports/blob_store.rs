//! BlobStore port - 名前付き Blob の保存先

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::ServiceError;

/// BlobStore は 1 つのコンテナを表す
///
/// `upload` は同名の Blob を上書きする（冪等）。
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// コンテナ名（ログ用）
    fn name(&self) -> &str;

    async fn create_if_not_exists(&self) -> Result<(), ServiceError>;

    async fn upload(&self, blob_name: &str, content: Bytes) -> Result<(), ServiceError>;

    async fn exists(&self, blob_name: &str) -> Result<bool, ServiceError>;

    async fn delete_if_exists(&self) -> Result<(), ServiceError>;
}
