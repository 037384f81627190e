//! Performer - 検出 → アップロード → レコード書き込み
//!
//! 途中で失敗したらその単位の残りの手順は行いません。巻き戻しもしません。
//! アップロードと insert-or-replace はどちらも上書きなので、何度やり直しても同じ状態になります。

use bytes::Bytes;
use tracing::{debug, info};

use crate::app::config::PipelineConfig;
use crate::domain::{FaceRecord, PipelineError, UnitId};
use crate::ports::{BlobStore, FaceDetector, RecordStore};

/// perform の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Performance {
    /// Blob とレコードを書いた
    Stored { faces: usize },
    /// 顔が無かったので何も書いていない
    NoDetections,
}

/// 検出対象のストア一式
pub struct Sinks<'a> {
    pub detector: &'a dyn FaceDetector,
    pub blobs: &'a dyn BlobStore,
    pub records: &'a dyn RecordStore,
}

pub async fn perform(
    sinks: &Sinks<'_>,
    config: &PipelineConfig,
    unit: &UnitId,
    content: Bytes,
    partition_key: &str,
) -> Result<Performance, PipelineError> {
    let detections = sinks
        .detector
        .detect(content.clone(), &config.attributes)
        .await?;
    info!("{} face(s) detected in {}", detections.len(), unit);

    if detections.is_empty() {
        return Ok(Performance::NoDetections);
    }

    sinks.blobs.upload(unit.as_str(), content).await?;
    debug!(container = sinks.blobs.name(), "uploaded blob");

    let record =
        FaceRecord::from_detections(partition_key, unit, &detections, config.max_attributes);
    sinks.records.insert_or_replace(&record).await?;
    debug!(
        table = sinks.records.name(),
        partition_key,
        attributes = record.len(),
        "stored record"
    );

    Ok(Performance::Stored {
        faces: detections.len(),
    })
}
