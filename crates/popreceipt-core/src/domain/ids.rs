//! Ids - 強い型付けの識別子
//!
//! # キューが払い出すトークン
//! MessageId と PopReceipt はどちらもキューサービスが払い出す不透明な文字列です。
//! 中身を解釈することはなく、削除・可視性変更のときにそのまま返すだけです。
//!
//! ## Phantom Type パターン
//! `Token<T>` で共通実装を持ちつつ、`T` をマーカー型にすることで
//! MessageId と PopReceipt をコンパイル時に区別します。
//! （delete の引数を取り違えるとコンパイルエラーになる）

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;
use ulid::Ulid;

/// TokenMarker は各トークン型のマーカー trait
pub trait TokenMarker: Send + Sync + 'static {
    /// Debug 出力で使うラベル
    fn label() -> &'static str;
}

/// キューサービスが払い出す不透明なトークン
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token<T: TokenMarker> {
    value: String,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: TokenMarker> Token<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    /// ULID から生成（in-memory 実装用）
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self::new(ulid.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl<T: TokenMarker> fmt::Debug for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", T::label(), self.value)
    }
}

impl<T: TokenMarker> fmt::Display for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

// ========================================
// マーカー型の定義
// ========================================

/// Message のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Message {}

impl TokenMarker for Message {
    fn label() -> &'static str {
        "MessageId"
    }
}

/// Receipt のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Receipt {}

impl TokenMarker for Receipt {
    fn label() -> &'static str {
        "PopReceipt"
    }
}

/// キューメッセージの ID（メッセージが存在する間は変わらない）
pub type MessageId = Token<Message>;

/// キューメッセージの pop receipt（読み出し・可視性変更のたびに払い出し直される）
pub type PopReceipt = Token<Receipt>;

/// UnitId は処理単位（入力画像のファイル名）
///
/// Blob 名・Table の RowKey・キューメッセージの本文として使われます。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(String);

impl UnitId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// パスのファイル名部分から UnitId を作成（ディレクトリ部分は捨てる）
    pub fn from_path(path: &Path) -> Option<Self> {
        path.file_name()
            .and_then(|name| name.to_str())
            .map(Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
