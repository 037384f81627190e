//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせて 1 画像ずつの協調処理を実装します。
//!
//! # 主要コンポーネント
//! - **AppBuilder**: Pipeline の構築とワイヤリング
//! - **Pipeline**: バッチ処理（announce → perform → verify → acknowledge）
//! - **announcer / performer / acknowledger**: 各ステップ
//! - **setup**: リソースの作成・削除、残りメッセージの確認

pub mod acknowledger;
pub mod announcer;
pub mod builder;
pub mod config;
pub mod images;
pub mod performer;
pub mod pipeline;
pub mod setup;

// 主要な型を再エクスポート
pub use self::builder::{AppBuilder, BuildError};
pub use self::config::{DEFAULT_IMAGES_DIR, DEFAULT_VISIBILITY_DELAY, PipelineConfig};
pub use self::images::ImageFile;
pub use self::pipeline::Pipeline;
