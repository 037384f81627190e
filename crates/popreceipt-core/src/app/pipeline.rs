//! Pipeline - 1 画像ずつ announce → perform → verify → acknowledge
//!
//! # フロー（1 単位）
//! 1. `announcer::announce` で可視性遅延つきメッセージを追加
//! 2. 画像を読み、`performer::perform` で検出・アップロード・書き込み
//! 3. `acknowledger::acknowledge` で確認して、announce 時の pop receipt で削除
//!
//! 単位ごとのエラーはその単位だけを止め、バッチは次の画像に進みます。
//! 完了しなかった単位はメッセージがキューに残り、遅延が切れると別の consumer から見えます。
//!
//! 並列化はしません。単位は 1 つずつ順番に処理します。

use std::sync::Arc;

use tracing::{Instrument, Span, error, field, info, info_span, warn};

use crate::app::acknowledger;
use crate::app::announcer;
use crate::app::config::PipelineConfig;
use crate::app::images::{self, ImageFile};
use crate::app::performer::{self, Performance, Sinks};
use crate::domain::{
    AbandonReason, BatchReport, ClassifyError, PipelineError, UnitOutcome, UnitReport,
};
use crate::ports::{BlobStore, Clock, EnqueuedMessage, FaceDetector, MessageQueue, RecordStore};

/// Pipeline は ports を束ねたバッチ処理本体
///
/// `AppBuilder` から作ります。
pub struct Pipeline {
    pub(crate) queue: Arc<dyn MessageQueue>,
    pub(crate) blobs: Arc<dyn BlobStore>,
    pub(crate) records: Arc<dyn RecordStore>,
    pub(crate) detector: Arc<dyn FaceDetector>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) config: PipelineConfig,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("queue", &self.queue.name())
            .field("container", &self.blobs.name())
            .field("table", &self.records.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// ディレクトリ内の画像をすべて処理する
    ///
    /// Err になるのは入力ディレクトリが読めないときだけで、その場合キューには何も追加しません。
    pub async fn run_batch(&self) -> Result<BatchReport, PipelineError> {
        let dir = &self.config.images_dir;
        let images = match images::list_images(dir).await {
            Ok(images) => images,
            Err(err) => {
                if err.is_missing_input() {
                    error!(
                        dir = %dir.display(),
                        "image directory not found; create it and put the .jpg files to process there"
                    );
                } else {
                    error!(dir = %dir.display(), error = %err, "could not list images");
                }
                return Err(err);
            }
        };

        info!(dir = %dir.display(), images = images.len(), "starting batch");
        let mut report = BatchReport::default();
        for image in &images {
            report.push(self.process_unit(image).await);
        }

        let counts = report.counts();
        info!(
            processed = counts.processed,
            acknowledged = counts.acknowledged,
            abandoned = counts.abandoned,
            failed = counts.failed,
            "batch finished"
        );
        Ok(report)
    }

    /// 1 単位を最後まで処理する（エラーは UnitOutcome::Failed に畳む）
    pub async fn process_unit(&self, image: &ImageFile) -> UnitReport {
        let span = info_span!("unit", unit = %image.unit, message_id = field::Empty);
        self.run_unit(image).instrument(span).await
    }

    async fn run_unit(&self, image: &ImageFile) -> UnitReport {
        info!(path = %image.path.display(), "Processing image");

        let message = match announcer::announce(
            self.queue.as_ref(),
            &image.unit,
            self.config.visibility_delay,
        )
        .await
        {
            Ok(message) => message,
            Err(err) => {
                let err = PipelineError::from(err);
                log_failure(&err);
                return UnitReport {
                    unit: image.unit.clone(),
                    message_id: None,
                    outcome: UnitOutcome::Failed(err.to_string()),
                };
            }
        };
        Span::current().record("message_id", message.message_id.as_str());

        let outcome = match self.complete_unit(image, &message).await {
            Ok(outcome) => outcome,
            Err(err) => {
                log_failure(&err);
                UnitOutcome::Failed(err.to_string())
            }
        };

        UnitReport {
            unit: image.unit.clone(),
            message_id: Some(message.message_id),
            outcome,
        }
    }

    async fn complete_unit(
        &self,
        image: &ImageFile,
        message: &EnqueuedMessage,
    ) -> Result<UnitOutcome, PipelineError> {
        let content = images::read_image(image).await?;
        // perform と verify で同じキーを使う（Dated で日付をまたいでも）
        let partition_key = self.config.partition.partition_key(self.clock.now());

        let sinks = Sinks {
            detector: self.detector.as_ref(),
            blobs: self.blobs.as_ref(),
            records: self.records.as_ref(),
        };
        match performer::perform(&sinks, &self.config, &image.unit, content, &partition_key).await? {
            Performance::NoDetections => {
                info!("no faces detected; message left for reconciliation");
                Ok(UnitOutcome::Abandoned(AbandonReason::NoDetections))
            }
            Performance::Stored { .. } => {
                let outcome = acknowledger::acknowledge(
                    self.queue.as_ref(),
                    self.blobs.as_ref(),
                    self.records.as_ref(),
                    message,
                    &image.unit,
                    &partition_key,
                )
                .await?;
                if outcome.is_acknowledged() {
                    info!("unit of work complete");
                }
                Ok(outcome)
            }
        }
    }
}

/// エラーの種類ごとにログを出し分ける
fn log_failure(err: &PipelineError) {
    match err {
        PipelineError::Storage(source) => error!(
            service = %source.service(),
            code = source.code().unwrap_or("-"),
            error = %source,
            "storage service error"
        ),
        PipelineError::Classify(ClassifyError::Service {
            status,
            code,
            message,
        }) => warn!(status, code = %code, message = %message, "face detection failed; skipping image"),
        PipelineError::Classify(source) => {
            warn!(error = %source, "face detection failed; skipping image")
        }
        PipelineError::Io { path, source } => {
            error!(path = %path.display(), error = %source, "could not read image")
        }
    }
}
