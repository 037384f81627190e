//! AppBuilder - Pipeline の構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - 開発体験の改善（明確なエラーメッセージ）

use std::sync::Arc;

use crate::app::config::PipelineConfig;
use crate::app::pipeline::Pipeline;
use crate::domain::MAX_RECORD_ATTRIBUTES;
use crate::ports::{BlobStore, Clock, FaceDetector, MessageQueue, RecordStore, SystemClock};

/// AppBuilder は Pipeline を構築
///
/// # 使用例
/// ```ignore
/// let pipeline = AppBuilder::new()
///     .queue(Arc::new(InMemoryQueue::new("samplequeue")))
///     .blob_store(Arc::new(InMemoryBlobStore::new("samplecontainer")))
///     .record_store(Arc::new(InMemoryRecordStore::new("sampletable")))
///     .detector(Arc::new(FaceApiClient::new(endpoint, key)))
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - キュー・Blob・テーブル・検出器の 4 つは必須
/// - build() 時に足りないものをまとめて BuildError で返す
/// - Clock と PipelineConfig は省略するとデフォルト
#[derive(Default)]
pub struct AppBuilder {
    queue: Option<Arc<dyn MessageQueue>>,
    blobs: Option<Arc<dyn BlobStore>>,
    records: Option<Arc<dyn RecordStore>>,
    detector: Option<Arc<dyn FaceDetector>>,
    clock: Option<Arc<dyn Clock>>,
    config: PipelineConfig,
}

/// BuildError は Pipeline 構築時のエラー
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("Missing ports: {0:?}. These collaborators must be provided before build().")]
    MissingPorts(Vec<&'static str>),

    #[error("max_attributes must be between 1 and {max}, got {0}", max = MAX_RECORD_ATTRIBUTES)]
    InvalidAttributeCap(usize),

    #[error("visibility delay must be greater than zero")]
    ZeroVisibilityDelay,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue(mut self, queue: Arc<dyn MessageQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    pub fn blob_store(mut self, blobs: Arc<dyn BlobStore>) -> Self {
        self.blobs = Some(blobs);
        self
    }

    pub fn record_store(mut self, records: Arc<dyn RecordStore>) -> Self {
        self.records = Some(records);
        self
    }

    pub fn detector(mut self, detector: Arc<dyn FaceDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// # 検証
    /// - 必須の port が全て設定されているか
    /// - 属性の上限が 1..=250 か
    /// - 可視性遅延が 0 でないか（0 だと announce 直後から他の consumer に見える）
    pub fn build(self) -> Result<Pipeline, BuildError> {
        let mut missing = Vec::new();
        if self.queue.is_none() {
            missing.push("queue");
        }
        if self.blobs.is_none() {
            missing.push("blob_store");
        }
        if self.records.is_none() {
            missing.push("record_store");
        }
        if self.detector.is_none() {
            missing.push("detector");
        }

        let (Some(queue), Some(blobs), Some(records), Some(detector)) =
            (self.queue, self.blobs, self.records, self.detector)
        else {
            return Err(BuildError::MissingPorts(missing));
        };

        if !(1..=MAX_RECORD_ATTRIBUTES).contains(&self.config.max_attributes) {
            return Err(BuildError::InvalidAttributeCap(self.config.max_attributes));
        }
        if self.config.visibility_delay.is_zero() {
            return Err(BuildError::ZeroVisibilityDelay);
        }

        Ok(Pipeline {
            queue,
            blobs,
            records,
            detector,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            config: self.config,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::impls::{InMemoryBlobStore, InMemoryQueue, InMemoryRecordStore, StaticFaceDetector};

    fn complete() -> AppBuilder {
        AppBuilder::new()
            .queue(Arc::new(InMemoryQueue::new("samplequeue")))
            .blob_store(Arc::new(InMemoryBlobStore::new("samplecontainer")))
            .record_store(Arc::new(InMemoryRecordStore::new("sampletable")))
            .detector(Arc::new(StaticFaceDetector::new()))
    }

    #[test]
    fn test_build_success() {
        let pipeline = complete().build().unwrap();
        assert_eq!(pipeline.config(), &PipelineConfig::default());
    }

    #[test]
    fn test_build_missing_ports() {
        let result = AppBuilder::new()
            .queue(Arc::new(InMemoryQueue::new("samplequeue")))
            .detector(Arc::new(StaticFaceDetector::new()))
            .build();
        assert!(matches!(
            result,
            Err(BuildError::MissingPorts(missing)) if missing == vec!["blob_store", "record_store"]
        ));
    }

    #[test]
    fn test_build_invalid_config() {
        let result = complete()
            .config(PipelineConfig::default().with_max_attributes(251))
            .build();
        assert!(matches!(result, Err(BuildError::InvalidAttributeCap(251))));

        let result = complete()
            .config(PipelineConfig::default().with_max_attributes(0))
            .build();
        assert!(matches!(result, Err(BuildError::InvalidAttributeCap(0))));

        let result = complete()
            .config(PipelineConfig::default().with_visibility_delay(Duration::ZERO))
            .build();
        assert!(matches!(result, Err(BuildError::ZeroVisibilityDelay)));
    }
}
