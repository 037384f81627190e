//! MessageQueue port - pop receipt を持つメッセージキュー
//!
//! # 前提とする契約
//! - `add_message` はメッセージ ID と pop receipt を返す
//! - pop receipt はメッセージが読まれる・可視性が変わるたびに払い出し直される
//! - `delete_message` は現在の pop receipt と一致しないと失敗する
//!
//! # 実装
//! - **InMemoryQueue**: 開発用・テスト用
//! - **AzureQueue**: Azure Storage Queue（`azure` feature）

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{MessageId, PopReceipt, ServiceError};

/// 追加したメッセージのハンドル
///
/// `pop_receipt` は追加した時点のもの。可視性が変わると古くなる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnqueuedMessage {
    pub message_id: MessageId,
    pub pop_receipt: PopReceipt,
    pub payload: String,
}

/// Peek で見えたメッセージ（pop receipt は払い出されない）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeekedMessage {
    pub message_id: MessageId,
    pub payload: String,
    /// Get Messages で取り出された回数（peek は数えない）
    pub dequeue_count: u64,
}

/// 協調処理で使うキュー操作
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// キュー名（ログ用）
    fn name(&self) -> &str;

    async fn create_if_not_exists(&self) -> Result<(), ServiceError>;

    /// `visibility_delay` の間は見えないメッセージを追加する
    async fn add_message(
        &self,
        payload: &str,
        visibility_delay: Duration,
    ) -> Result<EnqueuedMessage, ServiceError>;

    /// メッセージを削除する（`pop_receipt` が現在のものでなければ失敗）
    async fn delete_message(
        &self,
        message_id: &MessageId,
        pop_receipt: &PopReceipt,
    ) -> Result<(), ServiceError>;

    /// 可視性を変更し、新しく払い出された pop receipt を返す
    async fn update_visibility(
        &self,
        message: &EnqueuedMessage,
        visibility_delay: Duration,
    ) -> Result<PopReceipt, ServiceError>;

    /// 今見えているメッセージを覗く（pop receipt は変わらない）
    async fn peek_messages(&self, max: usize) -> Result<Vec<PeekedMessage>, ServiceError>;

    async fn delete_if_exists(&self) -> Result<(), ServiceError>;
}
