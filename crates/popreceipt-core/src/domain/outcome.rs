//! Outcome - バッチ内の各単位がどうなったか
//!
//! 状態遷移:
//! `announced → {performed-success, performed-failure} → {acknowledged | abandoned}`
//!
//! acknowledged 以外で終わった単位は、キューにメッセージが残ります。
//! 可視性の遅延が過ぎると別のワーカーから見えるようになり、それが回収の合図になります。

use serde::Serialize;

use super::ids::{MessageId, UnitId};

/// どのステップも失敗していないのにメッセージを残した理由
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AbandonReason {
    /// 顔が見つからなかった（何も書いていない）
    NoDetections,
    /// アップロード後に Blob を確認できなかった
    BlobMissing,
    /// insert-or-replace 後にレコードを確認できなかった
    RecordMissing,
}

/// 1 単位の最終結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitOutcome {
    /// 両方の副作用を確認し、pop receipt でメッセージを削除した
    Acknowledged,
    /// 確認できなかったのでメッセージには触れずに残した
    Abandoned(AbandonReason),
    /// 途中でエラー（メッセージが追加済みなら残っている）
    Failed(String),
}

impl UnitOutcome {
    pub fn is_acknowledged(&self) -> bool {
        matches!(self, UnitOutcome::Acknowledged)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitReport {
    pub unit: UnitId,
    /// announce 自体が失敗したときは `None`
    pub message_id: Option<MessageId>,
    pub outcome: UnitOutcome,
}

impl UnitReport {
    /// キューにメッセージが残っている（= 後続の回収対象）か
    pub fn left_in_queue(&self) -> bool {
        self.message_id.is_some() && !self.outcome.is_acknowledged()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchCounts {
    pub processed: usize,
    pub acknowledged: usize,
    pub abandoned: usize,
    pub failed: usize,
}

/// BatchReport は 1 回のバッチ実行の結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub units: Vec<UnitReport>,
}

impl BatchReport {
    pub fn push(&mut self, report: UnitReport) {
        self.units.push(report);
    }

    pub fn counts(&self) -> BatchCounts {
        let mut counts = BatchCounts::default();
        for report in &self.units {
            counts.processed += 1;
            match report.outcome {
                UnitOutcome::Acknowledged => counts.acknowledged += 1,
                UnitOutcome::Abandoned(_) => counts.abandoned += 1,
                UnitOutcome::Failed(_) => counts.failed += 1,
            }
        }
        counts
    }

    /// メッセージがまだキューに残っている単位
    pub fn incomplete(&self) -> Vec<&UnitId> {
        self.units
            .iter()
            .filter(|report| report.left_in_queue())
            .map(|report| &report.unit)
            .collect()
    }

    pub fn get(&self, unit: &str) -> Option<&UnitReport> {
        self.units.iter().find(|report| report.unit.as_str() == unit)
    }
}
