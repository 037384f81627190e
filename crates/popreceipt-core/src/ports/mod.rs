//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! Queue / Blob / Table / 顔検出の各サービスは中身を見ない協力者として扱い、
//! ここに定義した契約だけに依存します。
//!
//! # 設計原則
//! - 3 つのストレージ間にトランザクションは無い
//! - キューの pop receipt だけが「どこまで終わったか」の手がかり

pub mod blob_store;
pub mod clock;
pub mod face_detector;
pub mod message_queue;
pub mod record_store;

// 主要な trait を再エクスポート
pub use self::blob_store::BlobStore;
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::face_detector::FaceDetector;
pub use self::message_queue::{EnqueuedMessage, MessageQueue, PeekedMessage};
pub use self::record_store::RecordStore;
