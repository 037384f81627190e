//! InMemoryQueue - 開発用のメッセージキュー
//!
//! ストレージエミュレータの代わりに使う、pop receipt の挙動だけを再現した実装です。
//!
//! # 学習ポイント
//! - 可視性は Clock の時刻と `visible_at` の比較で判定する
//! - 可視性を変えるたびに pop receipt を払い出し直す
//! - tokio::sync::Mutex の中で await しない

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use ulid::Ulid;

use crate::domain::{MessageId, PopReceipt, ServiceError, ServiceKind};
use crate::ports::{Clock, EnqueuedMessage, MessageQueue, PeekedMessage, SystemClock};

/// 可視性タイムアウトの上限は 7 日
pub const MAX_VISIBILITY_DELAY: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Clone)]
struct StoredMessage {
    message_id: MessageId,
    pop_receipt: PopReceipt,
    payload: String,
    visible_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct QueueState {
    exists: bool,
    /// 追加順
    messages: Vec<StoredMessage>,
}

/// InMemoryQueue は開発用のキュー
///
/// # 使用例
/// ```ignore
/// let queue = InMemoryQueue::new("samplequeue");
/// queue.create_if_not_exists().await?;
/// let message = queue.add_message("photo1.jpg", Duration::from_secs(900)).await?;
/// queue.delete_message(&message.message_id, &message.pop_receipt).await?;
/// ```
pub struct InMemoryQueue {
    name: String,
    clock: Arc<dyn Clock>,
    state: Mutex<QueueState>,
}

impl InMemoryQueue {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_clock(name, Arc::new(SystemClock))
    }

    pub fn with_clock(name: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            name: name.into(),
            clock,
            state: Mutex::new(QueueState::default()),
        }
    }

    /// 可視・不可視を問わず、キューに残っているメッセージ数
    pub async fn approximate_message_count(&self) -> usize {
        self.state.lock().await.messages.len()
    }

    pub async fn contains(&self, message_id: &MessageId) -> bool {
        let state = self.state.lock().await;
        state.messages.iter().any(|m| &m.message_id == message_id)
    }

    fn new_token(&self) -> Ulid {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        Ulid::from_parts(timestamp_ms, rand::random())
    }

    fn visible_at(&self, delay: Duration) -> Result<DateTime<Utc>, ServiceError> {
        if delay > MAX_VISIBILITY_DELAY {
            return Err(ServiceError::InvalidInput {
                service: ServiceKind::Queue,
                code: "OutOfRangeQueryParameterValue".to_string(),
                message: format!(
                    "visibility delay of {}s exceeds {}s",
                    delay.as_secs(),
                    MAX_VISIBILITY_DELAY.as_secs()
                ),
            });
        }
        let delay = chrono::Duration::from_std(delay).map_err(|e| ServiceError::InvalidInput {
            service: ServiceKind::Queue,
            code: "InvalidQueryParameterValue".to_string(),
            message: e.to_string(),
        })?;
        Ok(self.clock.now() + delay)
    }

    fn queue_not_found(&self) -> ServiceError {
        ServiceError::not_found(ServiceKind::Queue, "QueueNotFound", &self.name)
    }
}

/// メッセージを探して、pop receipt が現在のものと一致するか確認する
fn find_current<'a>(
    messages: &'a mut [StoredMessage],
    message_id: &MessageId,
    pop_receipt: &PopReceipt,
) -> Result<&'a mut StoredMessage, ServiceError> {
    let message = messages
        .iter_mut()
        .find(|m| &m.message_id == message_id)
        .ok_or_else(|| {
            ServiceError::not_found(ServiceKind::Queue, "MessageNotFound", message_id.as_str())
        })?;
    if &message.pop_receipt != pop_receipt {
        return Err(ServiceError::ReceiptMismatch {
            message_id: message_id.to_string(),
        });
    }
    Ok(message)
}

#[async_trait]
impl MessageQueue for InMemoryQueue {
    fn name(&self) -> &str {
        &self.name
    }

    async fn create_if_not_exists(&self) -> Result<(), ServiceError> {
        self.state.lock().await.exists = true;
        Ok(())
    }

    async fn add_message(
        &self,
        payload: &str,
        visibility_delay: Duration,
    ) -> Result<EnqueuedMessage, ServiceError> {
        let visible_at = self.visible_at(visibility_delay)?;
        let message_id = MessageId::from_ulid(self.new_token());
        let pop_receipt = PopReceipt::from_ulid(self.new_token());

        let mut state = self.state.lock().await;
        if !state.exists {
            return Err(self.queue_not_found());
        }
        state.messages.push(StoredMessage {
            message_id: message_id.clone(),
            pop_receipt: pop_receipt.clone(),
            payload: payload.to_string(),
            visible_at,
        });

        Ok(EnqueuedMessage {
            message_id,
            pop_receipt,
            payload: payload.to_string(),
        })
    }

    async fn delete_message(
        &self,
        message_id: &MessageId,
        pop_receipt: &PopReceipt,
    ) -> Result<(), ServiceError> {
        let mut state = self.state.lock().await;
        if !state.exists {
            return Err(self.queue_not_found());
        }
        find_current(&mut state.messages, message_id, pop_receipt)?;
        state.messages.retain(|m| &m.message_id != message_id);
        Ok(())
    }

    async fn update_visibility(
        &self,
        message: &EnqueuedMessage,
        visibility_delay: Duration,
    ) -> Result<PopReceipt, ServiceError> {
        let visible_at = self.visible_at(visibility_delay)?;
        let new_receipt = PopReceipt::from_ulid(self.new_token());

        let mut state = self.state.lock().await;
        if !state.exists {
            return Err(self.queue_not_found());
        }
        let stored = find_current(&mut state.messages, &message.message_id, &message.pop_receipt)?;
        stored.visible_at = visible_at;
        stored.pop_receipt = new_receipt.clone();
        Ok(new_receipt)
    }

    async fn peek_messages(&self, max: usize) -> Result<Vec<PeekedMessage>, ServiceError> {
        let now = self.clock.now();
        let state = self.state.lock().await;
        if !state.exists {
            return Err(self.queue_not_found());
        }
        Ok(state
            .messages
            .iter()
            .filter(|m| m.visible_at <= now)
            .take(max)
            .map(|m| PeekedMessage {
                message_id: m.message_id.clone(),
                payload: m.payload.clone(),
                // 取り出し（Get Messages）は無いので、peek では数えない
                dequeue_count: 0,
            })
            .collect())
    }

    async fn delete_if_exists(&self) -> Result<(), ServiceError> {
        let mut state = self.state.lock().await;
        state.exists = false;
        state.messages.clear();
        Ok(())
    }
}
