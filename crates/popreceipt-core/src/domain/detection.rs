//! Detection - 顔検出サービスの結果

use serde::{Deserialize, Serialize};
use std::fmt;

/// 検出サービスに要求する属性
///
/// 現状は推定年齢（Age）のみを使います。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FaceAttribute {
    Age,
}

impl FaceAttribute {
    /// REST API の `returnFaceAttributes` に渡す名前
    pub fn as_str(&self) -> &'static str {
        match self {
            FaceAttribute::Age => "age",
        }
    }
}

impl fmt::Display for FaceAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 検出された顔 1 つ分（サービスが返した順）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// 推定年齢（歳）
    pub age: f64,
}

impl Detection {
    pub fn with_age(age: f64) -> Self {
        Self { age }
    }
}
