//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **InMemoryQueue / InMemoryBlobStore / InMemoryRecordStore**: 開発・テスト用（エミュレータの代わり）
//! - **StaticFaceDetector**: 内容 → 検出結果の固定表
//! - **FaceApiClient**: 顔検出 REST API
//! - **azure**: Azure Storage（`azure` feature）

pub mod face_api;
pub mod inmem_blob;
pub mod inmem_queue;
pub mod inmem_table;
pub mod static_detector;

#[cfg(feature = "azure")]
pub mod azure;

// 主要な型を再エクスポート
pub use self::face_api::{DEFAULT_FACE_ENDPOINT, FaceApiClient};
pub use self::inmem_blob::InMemoryBlobStore;
pub use self::inmem_queue::{InMemoryQueue, MAX_VISIBILITY_DELAY};
pub use self::inmem_table::InMemoryRecordStore;
pub use self::static_detector::StaticFaceDetector;
