//! Announcer - 危険な作業の前に「これからやる」をキューに書く
//!
//! メッセージは可視性遅延つきで追加するので、遅延が切れるまで誰にも見えません。
//! 遅延が切れてもまだ残っていれば、その単位は完了していないということです。

use std::time::Duration;

use tracing::debug;

use crate::domain::{ServiceError, UnitId};
use crate::ports::{EnqueuedMessage, MessageQueue};

/// 単位の ID をペイロードにしてメッセージを追加する
///
/// 返ってきた pop receipt は、遅延が切れるまでに使わなければ古くなります。
pub async fn announce(
    queue: &dyn MessageQueue,
    unit: &UnitId,
    visibility_delay: Duration,
) -> Result<EnqueuedMessage, ServiceError> {
    let message = queue.add_message(unit.as_str(), visibility_delay).await?;
    debug!(
        queue = queue.name(),
        message_id = %message.message_id,
        delay_secs = visibility_delay.as_secs(),
        "announced unit of work"
    );
    Ok(message)
}
