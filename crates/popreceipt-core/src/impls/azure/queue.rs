//! AzureQueue - Storage Queue
//!
//! 削除と可視性変更には追加時の pop receipt をそのまま渡します。
//! 古い pop receipt は `ServiceError::ReceiptMismatch` になります。

use std::time::Duration;

use async_trait::async_trait;
use azure_storage::StorageCredentials;
use azure_storage_queues::{PopReceipt as AzurePopReceipt, QueueClient, QueueServiceClient};

use super::{ignore_already_exists, ignore_not_found, service_error};
use crate::domain::{MessageId, PopReceipt, ServiceError, ServiceKind};
use crate::ports::{EnqueuedMessage, MessageQueue, PeekedMessage};

/// Peek は 1 回で最大 32 件
const MAX_PEEK: usize = 32;

pub struct AzureQueue {
    name: String,
    queue: QueueClient,
}

impl AzureQueue {
    pub fn new(account: &str, credentials: StorageCredentials, queue: &str) -> Self {
        let service = QueueServiceClient::new(account.to_string(), credentials);
        Self {
            name: queue.to_string(),
            queue: service.queue_client(queue),
        }
    }

    fn receipt(message_id: &MessageId, pop_receipt: &PopReceipt) -> AzurePopReceipt {
        AzurePopReceipt::new(message_id.as_str(), pop_receipt.as_str())
    }
}

/// 古い pop receipt は 400 PopReceiptMismatch で返ってくる
fn receipt_error(message_id: &MessageId, err: azure_core::Error) -> ServiceError {
    match service_error(ServiceKind::Queue, err) {
        ServiceError::Request {
            code: Some(code), ..
        } if code == "PopReceiptMismatch" => ServiceError::ReceiptMismatch {
            message_id: message_id.to_string(),
        },
        other => other,
    }
}

#[async_trait]
impl MessageQueue for AzureQueue {
    fn name(&self) -> &str {
        &self.name
    }

    async fn create_if_not_exists(&self) -> Result<(), ServiceError> {
        let result = self.queue.create().await.map(|_| ());
        ignore_already_exists(ServiceKind::Queue, result)
    }

    async fn add_message(
        &self,
        payload: &str,
        visibility_delay: Duration,
    ) -> Result<EnqueuedMessage, ServiceError> {
        let response = self
            .queue
            .put_message(payload.to_string())
            .visibility_timeout(visibility_delay)
            .await
            .map_err(|e| service_error(ServiceKind::Queue, e))?;

        Ok(EnqueuedMessage {
            message_id: MessageId::new(response.queue_message.message_id),
            pop_receipt: PopReceipt::new(response.queue_message.pop_receipt),
            payload: payload.to_string(),
        })
    }

    async fn delete_message(
        &self,
        message_id: &MessageId,
        pop_receipt: &PopReceipt,
    ) -> Result<(), ServiceError> {
        self.queue
            .pop_receipt_client(Self::receipt(message_id, pop_receipt))
            .delete()
            .await
            .map(|_| ())
            .map_err(|e| receipt_error(message_id, e))
    }

    async fn update_visibility(
        &self,
        message: &EnqueuedMessage,
        visibility_delay: Duration,
    ) -> Result<PopReceipt, ServiceError> {
        // Update Message は本文も送り直すので、追加時の本文をそのまま渡す
        let response = self
            .queue
            .pop_receipt_client(Self::receipt(&message.message_id, &message.pop_receipt))
            .update(message.payload.clone(), visibility_delay)
            .await
            .map_err(|e| receipt_error(&message.message_id, e))?;
        Ok(PopReceipt::new(response.pop_receipt))
    }

    async fn peek_messages(&self, max: usize) -> Result<Vec<PeekedMessage>, ServiceError> {
        let count = max.clamp(1, MAX_PEEK) as u8;
        let response = self
            .queue
            .peek_messages()
            .number_of_messages(count)
            .await
            .map_err(|e| service_error(ServiceKind::Queue, e))?;

        Ok(response
            .messages
            .into_iter()
            .map(|m| PeekedMessage {
                message_id: MessageId::new(m.message_id),
                payload: m.message_text,
                dequeue_count: m.dequeue_count,
            })
            .collect())
    }

    async fn delete_if_exists(&self) -> Result<(), ServiceError> {
        let result = self.queue.delete().await.map(|_| ());
        ignore_not_found(ServiceKind::Queue, result)
    }
}
