//! Errors - エラー型と分類
//!
//! # 分類
//! - `ServiceError`: Queue / Blob / Table サービスのエラー（プロバイダのエラーコード付き）
//! - `ClassifyError`: 顔検出サービスのエラー
//! - `PipelineError`: 1 画像分の処理で起きたエラー（上記 + ローカル I/O）
//! - `SetupError`: リソース作成の失敗（これだけはバッチ全体を中断する）
//!
//! どのエラーもこのクレートではリトライしません。
//! リトライはクライアントライブラリ側の責務です。

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// どのマネージドサービスのエラーか
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Queue,
    Blob,
    Table,
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceKind::Queue => f.write_str("queue"),
            ServiceKind::Blob => f.write_str("blob"),
            ServiceKind::Table => f.write_str("table"),
        }
    }
}

/// マネージドサービスのエラー（プロバイダのエラーコードがあれば保持）
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("{service} resource not found: {name}")]
    NotFound {
        service: ServiceKind,
        /// プロバイダのエラーコード（`MessageNotFound`, `QueueNotFound` など）
        code: String,
        name: String,
    },

    #[error("pop receipt does not match the current receipt of message {message_id}")]
    ReceiptMismatch { message_id: String },

    #[error("{service} request rejected: {message}")]
    InvalidInput {
        service: ServiceKind,
        code: String,
        message: String,
    },

    #[error("{service} request failed (status={status:?}, code={code:?}): {message}")]
    Request {
        service: ServiceKind,
        status: Option<u16>,
        code: Option<String>,
        message: String,
    },
}

impl ServiceError {
    pub fn not_found(service: ServiceKind, code: &str, name: impl Into<String>) -> Self {
        ServiceError::NotFound {
            service,
            code: code.to_string(),
            name: name.into(),
        }
    }

    /// プロバイダのエラーコード（ログ出力用）
    pub fn code(&self) -> Option<&str> {
        match self {
            ServiceError::NotFound { code, .. } => Some(code),
            ServiceError::ReceiptMismatch { .. } => Some("PopReceiptMismatch"),
            ServiceError::InvalidInput { code, .. } => Some(code),
            ServiceError::Request { code, .. } => code.as_deref(),
        }
    }

    pub fn service(&self) -> ServiceKind {
        match self {
            ServiceError::NotFound { service, .. }
            | ServiceError::InvalidInput { service, .. }
            | ServiceError::Request { service, .. } => *service,
            ServiceError::ReceiptMismatch { .. } => ServiceKind::Queue,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound { .. })
    }
}

/// 顔検出サービスのエラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifyError {
    /// サービスがエラーのレスポンスを返した
    #[error("face API error {code}: {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },

    #[error("face API request failed: {0}")]
    Transport(String),

    #[error("unexpected face API response: {0}")]
    Decode(String),
}

/// 1 画像分の処理のエラー
///
/// このエラーで中断されるのはその画像だけで、バッチは次の画像に進みます。
/// キューのメッセージは残り、後続のワーカーが回収します。
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("storage error: {0}")]
    Storage(#[from] ServiceError),

    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }

    /// 入力ディレクトリやファイルが見つからない
    pub fn is_missing_input(&self) -> bool {
        matches!(
            self,
            PipelineError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}

/// リソース作成の失敗（実行全体を中断する）
#[derive(Debug, thiserror::Error)]
#[error("failed to provision {service} resource '{name}': {source}")]
pub struct SetupError {
    pub service: ServiceKind,
    pub name: String,
    #[source]
    pub source: ServiceError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_exposes_provider_code() {
        let err = ServiceError::not_found(ServiceKind::Queue, "MessageNotFound", "m-1");
        assert_eq!(err.code(), Some("MessageNotFound"));
        assert_eq!(err.service(), ServiceKind::Queue);
        assert!(err.is_not_found());

        let err = ServiceError::ReceiptMismatch {
            message_id: "m-1".to_string(),
        };
        assert_eq!(err.code(), Some("PopReceiptMismatch"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn missing_directory_is_detected() {
        let err = PipelineError::io(
            "testfolder",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.is_missing_input());
        assert!(err.to_string().contains("testfolder"));

        let err = PipelineError::io(
            "testfolder/photo1.jpg",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!err.is_missing_input());
    }
}
