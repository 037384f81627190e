//! RecordStore port - (PartitionKey, RowKey) で引く構造化レコード

use async_trait::async_trait;

use crate::domain::{FaceRecord, ServiceError};

/// RecordStore は 1 つのテーブルを表す
///
/// # 設計原則
/// - 書き込みは insert-or-replace のみ（冪等）
/// - 取得できなかった場合は `Ok(None)`（テーブル自体が無いときはエラー）
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// テーブル名（ログ用）
    fn name(&self) -> &str;

    async fn create_if_not_exists(&self) -> Result<(), ServiceError>;

    async fn insert_or_replace(&self, record: &FaceRecord) -> Result<(), ServiceError>;

    async fn retrieve(
        &self,
        partition_key: &str,
        row_key: &str,
    ) -> Result<Option<FaceRecord>, ServiceError>;

    async fn delete_if_exists(&self) -> Result<(), ServiceError>;
}
