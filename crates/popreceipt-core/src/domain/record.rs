//! FaceRecord - Table に書き込む構造化レコード
//!
//! # キー
//! - PartitionKey: `PartitionStrategy` で決まる（既定は固定の `FaceImages`）
//! - RowKey: 画像のファイル名
//!
//! # プロパティ
//! 検出された顔ごとに `person1`, `person2`, ... → 推定年齢（文字列）。
//! 1 エンティティのプロパティ数には上限があるため `MAX_RECORD_ATTRIBUTES` で打ち切ります。

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::detection::Detection;
use super::ids::UnitId;

/// 1 エンティティのプロパティは 252 個まで（うち 3 つはシステムプロパティ）
pub const MAX_RECORD_ATTRIBUTES: usize = 250;

pub const DEFAULT_PARTITION_KEY: &str = "FaceImages";

const ATTRIBUTE_PREFIX: &str = "person";

/// PartitionStrategy は PartitionKey の決め方
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionStrategy {
    /// 固定の PartitionKey
    Fixed(String),
    /// 処理日（UTC, `YYYY-MM-DD`）を PartitionKey にする
    Dated,
}

impl PartitionStrategy {
    pub fn partition_key(&self, now: DateTime<Utc>) -> String {
        match self {
            PartitionStrategy::Fixed(key) => key.clone(),
            PartitionStrategy::Dated => now.format("%Y-%m-%d").to_string(),
        }
    }
}

impl Default for PartitionStrategy {
    fn default() -> Self {
        PartitionStrategy::Fixed(DEFAULT_PARTITION_KEY.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("partition key must not be empty")]
pub struct EmptyPartitionKey;

impl FromStr for PartitionStrategy {
    type Err = EmptyPartitionKey;

    /// `dated` なら日付ベース、それ以外はその文字列を固定キーとして使う
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmptyPartitionKey);
        }
        if s.eq_ignore_ascii_case("dated") {
            return Ok(PartitionStrategy::Dated);
        }
        Ok(PartitionStrategy::Fixed(s.to_string()))
    }
}

impl fmt::Display for PartitionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionStrategy::Fixed(key) => f.write_str(key),
            PartitionStrategy::Dated => f.write_str("dated"),
        }
    }
}

/// (partition, row) をキーにした疎なレコード
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceRecord {
    pub partition_key: String,
    pub row_key: String,
    pub properties: BTreeMap<String, String>,
}

impl FaceRecord {
    pub fn new(partition_key: impl Into<String>, row_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            row_key: row_key.into(),
            properties: BTreeMap::new(),
        }
    }

    /// 検出結果からレコードを組み立てる
    ///
    /// 検出順に `person1` から番号を振り、`cap` 件を超えた分は捨てます。
    pub fn from_detections(
        partition_key: impl Into<String>,
        unit: &UnitId,
        detections: &[Detection],
        cap: usize,
    ) -> Self {
        let mut record = Self::new(partition_key, unit.as_str());
        for (index, detection) in detections.iter().take(cap).enumerate() {
            record.properties.insert(
                format!("{ATTRIBUTE_PREFIX}{}", index + 1),
                format_age(detection.age),
            );
        }
        record
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// 整数の年齢は小数点なしで書く（34.0 → "34"）
pub fn format_age(age: f64) -> String {
    format!("{age}")
}
