//! Setup - リソースの作成と後片付け
//!
//! - `provision`: キュー・コンテナ・テーブルを（無ければ）作る。失敗したらバッチは始めない
//! - `teardown`: 3 つを個別に削除する。失敗はログに出すだけ
//! - `pending`: キューに残っているメッセージ（= 未完了の単位）を覗く

use tracing::{error, info, warn};

use crate::app::pipeline::Pipeline;
use crate::domain::{ServiceError, ServiceKind, SetupError};
use crate::ports::PeekedMessage;

fn setup_error(service: ServiceKind, name: &str, source: ServiceError) -> SetupError {
    error!(
        service = %service,
        name,
        code = source.code().unwrap_or("-"),
        error = %source,
        "failed to create resource"
    );
    SetupError {
        service,
        name: name.to_string(),
        source,
    }
}

impl Pipeline {
    pub async fn provision(&self) -> Result<(), SetupError> {
        self.queue
            .create_if_not_exists()
            .await
            .map_err(|e| setup_error(ServiceKind::Queue, self.queue.name(), e))?;
        info!(queue = self.queue.name(), "queue ready");

        self.blobs
            .create_if_not_exists()
            .await
            .map_err(|e| setup_error(ServiceKind::Blob, self.blobs.name(), e))?;
        info!(container = self.blobs.name(), "container ready");

        self.records
            .create_if_not_exists()
            .await
            .map_err(|e| setup_error(ServiceKind::Table, self.records.name(), e))?;
        info!(table = self.records.name(), "table ready");

        Ok(())
    }

    /// 3 つのリソースを削除する（どれかが失敗しても残りは続ける）
    pub async fn teardown(&self) {
        match self.queue.delete_if_exists().await {
            Ok(()) => info!(queue = self.queue.name(), "deleted queue"),
            Err(e) => warn!(queue = self.queue.name(), code = e.code().unwrap_or("-"), error = %e, "failed to delete queue"),
        }
        match self.blobs.delete_if_exists().await {
            Ok(()) => info!(container = self.blobs.name(), "deleted container"),
            Err(e) => warn!(container = self.blobs.name(), code = e.code().unwrap_or("-"), error = %e, "failed to delete container"),
        }
        match self.records.delete_if_exists().await {
            Ok(()) => info!(table = self.records.name(), "deleted table"),
            Err(e) => warn!(table = self.records.name(), code = e.code().unwrap_or("-"), error = %e, "failed to delete table"),
        }
    }

    /// 可視になっている残りメッセージ（pop receipt は払い出さない）
    pub async fn pending(&self, max: usize) -> Result<Vec<PeekedMessage>, ServiceError> {
        self.queue.peek_messages(max).await
    }
}
