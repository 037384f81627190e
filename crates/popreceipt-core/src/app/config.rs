//! PipelineConfig - バッチ 1 回分の設定

use std::path::PathBuf;
use std::time::Duration;

use crate::domain::{FaceAttribute, MAX_RECORD_ATTRIBUTES, PartitionStrategy};

pub const DEFAULT_IMAGES_DIR: &str = "testfolder";

/// 検出 → アップロード → 書き込み にかかる最悪時間より長くしておく
pub const DEFAULT_VISIBILITY_DELAY: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// `*.jpg` を読むディレクトリ
    pub images_dir: PathBuf,
    /// 告知メッセージの可視性遅延
    pub visibility_delay: Duration,
    pub partition: PartitionStrategy,
    /// 1 レコードに書く顔の数の上限
    pub max_attributes: usize,
    /// 検出サービスに要求する属性
    pub attributes: Vec<FaceAttribute>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            images_dir: PathBuf::from(DEFAULT_IMAGES_DIR),
            visibility_delay: DEFAULT_VISIBILITY_DELAY,
            partition: PartitionStrategy::default(),
            max_attributes: MAX_RECORD_ATTRIBUTES,
            attributes: vec![FaceAttribute::Age],
        }
    }
}

impl PipelineConfig {
    pub fn with_images_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.images_dir = dir.into();
        self
    }

    pub fn with_visibility_delay(mut self, delay: Duration) -> Self {
        self.visibility_delay = delay;
        self
    }

    pub fn with_partition(mut self, partition: PartitionStrategy) -> Self {
        self.partition = partition;
        self
    }

    pub fn with_max_attributes(mut self, max: usize) -> Self {
        self.max_attributes = max;
        self
    }
}
