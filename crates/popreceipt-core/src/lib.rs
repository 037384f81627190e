//! popreceipt-core
//!
//! キューの pop receipt を使って、トランザクションの無い 2 つのストレージ
//! （Blob と Table）への書き込みを協調させるための部品。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, detection, record, outcome, errors）
//! - **ports**: 抽象化レイヤー（MessageQueue, BlobStore, RecordStore, FaceDetector, Clock）
//! - **impls**: 実装（in-memory、顔検出 REST クライアント、Azure Storage）
//! - **app**: アプリケーションロジック（announcer, performer, acknowledger, pipeline, builder）
//!
//! # 不変条件
//! メッセージをキューから消すのは、その単位の Blob とレコードの両方を確認できたときだけ。

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;
