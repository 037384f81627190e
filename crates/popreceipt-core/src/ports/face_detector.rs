//! FaceDetector port - 外部の顔検出サービス
//!
//! # 実装
//! - **FaceApiClient**: REST の検出エンドポイント
//! - **StaticFaceDetector**: 画像の中身から結果を引く表（テスト・デモ用）

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::{ClassifyError, Detection, FaceAttribute};

#[async_trait]
pub trait FaceDetector: Send + Sync {
    /// `content` の顔を検出する（順序はサービスが返した順）
    async fn detect(
        &self,
        content: Bytes,
        attributes: &[FaceAttribute],
    ) -> Result<Vec<Detection>, ClassifyError>;
}
