//! Acknowledger - 両方の副作用を確認してからメッセージを消す
//!
//! - Blob が存在し、かつレコードが取得できたら、announce 時の pop receipt で削除
//! - どちらかが確認できなければメッセージには触れない（可視性も変えない）
//!
//! 削除はリトライしません。pop receipt が古くなっていれば（遅延が切れた等）そのまま失敗します。

use tracing::{debug, warn};

use crate::domain::{AbandonReason, ServiceError, UnitId, UnitOutcome};
use crate::ports::{BlobStore, EnqueuedMessage, MessageQueue, RecordStore};

pub async fn acknowledge(
    queue: &dyn MessageQueue,
    blobs: &dyn BlobStore,
    records: &dyn RecordStore,
    message: &EnqueuedMessage,
    unit: &UnitId,
    partition_key: &str,
) -> Result<UnitOutcome, ServiceError> {
    if !blobs.exists(unit.as_str()).await? {
        warn!(container = blobs.name(), "blob not found after upload; leaving message");
        return Ok(UnitOutcome::Abandoned(AbandonReason::BlobMissing));
    }

    if records
        .retrieve(partition_key, unit.as_str())
        .await?
        .is_none()
    {
        warn!(
            table = records.name(),
            partition_key, "record not found after write; leaving message"
        );
        return Ok(UnitOutcome::Abandoned(AbandonReason::RecordMissing));
    }

    queue
        .delete_message(&message.message_id, &message.pop_receipt)
        .await?;
    debug!(queue = queue.name(), "message deleted");
    Ok(UnitOutcome::Acknowledged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FaceRecord;
    use crate::impls::{InMemoryBlobStore, InMemoryQueue, InMemoryRecordStore};
    use bytes::Bytes;
    use std::time::Duration;

    struct Fixture {
        queue: InMemoryQueue,
        blobs: InMemoryBlobStore,
        records: InMemoryRecordStore,
        message: EnqueuedMessage,
        unit: UnitId,
    }

    async fn fixture() -> Fixture {
        let queue = InMemoryQueue::new("samplequeue");
        let blobs = InMemoryBlobStore::new("samplecontainer");
        let records = InMemoryRecordStore::new("sampletable");
        queue.create_if_not_exists().await.unwrap();
        blobs.create_if_not_exists().await.unwrap();
        records.create_if_not_exists().await.unwrap();

        let unit = UnitId::new("photo1.jpg");
        let message = queue
            .add_message(unit.as_str(), Duration::from_secs(900))
            .await
            .unwrap();
        Fixture {
            queue,
            blobs,
            records,
            message,
            unit,
        }
    }

    async fn run(f: &Fixture) -> Result<UnitOutcome, ServiceError> {
        acknowledge(&f.queue, &f.blobs, &f.records, &f.message, &f.unit, "FaceImages").await
    }

    #[tokio::test]
    async fn deletes_message_when_both_side_effects_exist() {
        let f = fixture().await;
        f.blobs
            .upload("photo1.jpg", Bytes::from_static(b"jpeg"))
            .await
            .unwrap();
        f.records
            .insert_or_replace(&FaceRecord::new("FaceImages", "photo1.jpg"))
            .await
            .unwrap();

        assert_eq!(run(&f).await.unwrap(), UnitOutcome::Acknowledged);
        assert!(!f.queue.contains(&f.message.message_id).await);
    }

    #[tokio::test]
    async fn missing_blob_leaves_message() {
        let f = fixture().await;
        f.records
            .insert_or_replace(&FaceRecord::new("FaceImages", "photo1.jpg"))
            .await
            .unwrap();

        assert_eq!(
            run(&f).await.unwrap(),
            UnitOutcome::Abandoned(AbandonReason::BlobMissing)
        );
        assert!(f.queue.contains(&f.message.message_id).await);
    }

    #[tokio::test]
    async fn record_in_other_partition_does_not_count() {
        let f = fixture().await;
        f.blobs
            .upload("photo1.jpg", Bytes::from_static(b"jpeg"))
            .await
            .unwrap();
        f.records
            .insert_or_replace(&FaceRecord::new("2024-01-01", "photo1.jpg"))
            .await
            .unwrap();

        assert_eq!(
            run(&f).await.unwrap(),
            UnitOutcome::Abandoned(AbandonReason::RecordMissing)
        );
        assert!(f.queue.contains(&f.message.message_id).await);
    }

    #[tokio::test]
    async fn stale_receipt_fails_delete() {
        let f = fixture().await;
        f.blobs
            .upload("photo1.jpg", Bytes::from_static(b"jpeg"))
            .await
            .unwrap();
        f.records
            .insert_or_replace(&FaceRecord::new("FaceImages", "photo1.jpg"))
            .await
            .unwrap();
        f.queue
            .update_visibility(&f.message, Duration::ZERO)
            .await
            .unwrap();

        let err = run(&f).await.unwrap_err();
        assert!(matches!(err, ServiceError::ReceiptMismatch { .. }));
        assert!(f.queue.contains(&f.message.message_id).await);
        assert!(f.blobs.exists("photo1.jpg").await.unwrap());
        assert_eq!(f.records.len().await, 1);
    }
}
