//! Domain - ドメインモデル（ids, detection, record, outcome, errors）

pub mod detection;
pub mod errors;
pub mod ids;
pub mod outcome;
pub mod record;

pub use detection::{Detection, FaceAttribute};
pub use errors::{ClassifyError, PipelineError, ServiceError, ServiceKind, SetupError};
pub use ids::{MessageId, PopReceipt, UnitId};
pub use outcome::{AbandonReason, BatchCounts, BatchReport, UnitOutcome, UnitReport};
pub use record::{
    DEFAULT_PARTITION_KEY, FaceRecord, MAX_RECORD_ATTRIBUTES, PartitionStrategy, format_age,
};
