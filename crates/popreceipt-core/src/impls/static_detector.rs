//! StaticFaceDetector - 画像の中身 → 検出結果 の表
//!
//! 外部サービスを呼ばずにパイプラインを動かすためのもの（テスト・デモ用）。

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::{ClassifyError, Detection, FaceAttribute};
use crate::ports::FaceDetector;

#[derive(Debug, Clone)]
enum Scripted {
    Faces(Vec<Detection>),
    Error { code: String, message: String },
}

/// 登録されていない中身には「顔なし」を返す
#[derive(Debug, Default)]
pub struct StaticFaceDetector {
    responses: HashMap<Bytes, Scripted>,
    calls: AtomicUsize,
}

impl StaticFaceDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_faces(mut self, content: impl Into<Bytes>, detections: Vec<Detection>) -> Self {
        self.responses
            .insert(content.into(), Scripted::Faces(detections));
        self
    }

    pub fn with_error(
        mut self,
        content: impl Into<Bytes>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.responses.insert(
            content.into(),
            Scripted::Error {
                code: code.into(),
                message: message.into(),
            },
        );
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl FaceDetector for StaticFaceDetector {
    async fn detect(
        &self,
        content: Bytes,
        _attributes: &[FaceAttribute],
    ) -> Result<Vec<Detection>, ClassifyError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        match self.responses.get(&content) {
            Some(Scripted::Faces(detections)) => Ok(detections.clone()),
            Some(Scripted::Error { code, message }) => Err(ClassifyError::Service {
                status: 400,
                code: code.clone(),
                message: message.clone(),
            }),
            None => Ok(Vec::new()),
        }
    }
}
