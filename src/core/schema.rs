// テーブルメタデータのドメインモデル
//
// カラム定義（FieldSchema）、順序付きのテーブルスキーマ（TableSchema）、
// テーブル単位のメタデータ（TableMetadata）を提供します。

use chrono::{DateTime, Utc};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// CREATE TABLE生成時に常に除外されるカラム名
///
/// これらのタイムスタンプ列は別経路で管理されるため、
/// 保存済みスキーマに含まれていても生成文には出力しない。
pub const RESERVED_TIMESTAMP_COLUMNS: [&str; 2] = ["created_at", "updated_at"];

/// 予約済みタイムスタンプ列かどうか
pub fn is_reserved_timestamp_column(name: &str) -> bool {
    RESERVED_TIMESTAMP_COLUMNS.contains(&name)
}

/// NULL許可の指定
///
/// 永続化形式およびMySQLの`DESC`出力では `"NO"` / `"YES"` / `""` で表現されます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Nullable {
    /// 指定なし
    #[default]
    Unspecified,
    /// NOT NULL
    NotNull,
    /// NULL許可
    Null,
}

impl Nullable {
    /// 方言の出力やメタデータファイルの文字列から変換
    pub fn from_marker(marker: &str) -> Self {
        match marker.trim().to_ascii_uppercase().as_str() {
            "NO" | "NOT NULL" => Nullable::NotNull,
            "YES" | "NULL" => Nullable::Null,
            _ => Nullable::Unspecified,
        }
    }

    /// 永続化形式の文字列
    pub fn as_marker(&self) -> &'static str {
        match self {
            Nullable::Unspecified => "",
            Nullable::NotNull => "NO",
            Nullable::Null => "YES",
        }
    }

    pub fn is_not_null(&self) -> bool {
        matches!(self, Nullable::NotNull)
    }
}

impl From<String> for Nullable {
    fn from(value: String) -> Self {
        Nullable::from_marker(&value)
    }
}

impl From<Nullable> for String {
    fn from(value: Nullable) -> Self {
        value.as_marker().to_string()
    }
}

/// キー種別
///
/// 永続化形式およびMySQLの`DESC`出力では `"PRI"` / `"UNI"` / `""` で表現されます。
/// MySQLの`MUL`（非ユニークインデックス）は`None`として扱います。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum KeyKind {
    #[default]
    None,
    Unique,
    Primary,
}

impl KeyKind {
    /// 方言の出力やメタデータファイルの文字列から変換
    pub fn from_marker(marker: &str) -> Self {
        match marker.trim().to_ascii_uppercase().as_str() {
            "PRI" => KeyKind::Primary,
            "UNI" => KeyKind::Unique,
            _ => KeyKind::None,
        }
    }

    /// 永続化形式の文字列
    pub fn as_marker(&self) -> &'static str {
        match self {
            KeyKind::None => "",
            KeyKind::Unique => "UNI",
            KeyKind::Primary => "PRI",
        }
    }
}

impl From<String> for KeyKind {
    fn from(value: String) -> Self {
        KeyKind::from_marker(&value)
    }
}

impl From<KeyKind> for String {
    fn from(value: KeyKind) -> Self {
        value.as_marker().to_string()
    }
}

/// カラム定義
///
/// 方言ネイティブの型文字列と修飾情報を保持します。値としてのみ比較されます。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldSchema {
    /// 方言ネイティブの型（例: `varchar(255)`）
    #[serde(rename = "Type")]
    pub column_type: String,

    /// NULL許可
    #[serde(rename = "Null", default)]
    pub nullable: Nullable,

    /// キー種別
    #[serde(rename = "Key", default)]
    pub key: KeyKind,

    /// 方言固有の修飾子（例: `auto_increment`）
    #[serde(rename = "Extra", default)]
    pub extra: String,
}

impl FieldSchema {
    /// 型を指定して新しいカラム定義を作成
    pub fn new(column_type: impl Into<String>) -> Self {
        Self {
            column_type: column_type.into(),
            ..Self::default()
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = Nullable::NotNull;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = Nullable::Null;
        self
    }

    pub fn unique(mut self) -> Self {
        self.key = KeyKind::Unique;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.key = KeyKind::Primary;
        self
    }

    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = extra.into();
        self
    }
}

/// 順序付きテーブルスキーマ
///
/// カラム名とカラム定義の組を挿入順に保持します。
/// この順序がCREATE TABLE文のカラム順になるため、
/// 取り込みから永続化、SQL生成まで順序を保ったまま扱います。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableSchema {
    columns: Vec<(String, FieldSchema)>,
}

impl TableSchema {
    /// 空のスキーマを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// カラムを追加したスキーマを返す（ビルダー用）
    pub fn with_column(mut self, name: impl Into<String>, field: FieldSchema) -> Self {
        self.insert(name, field);
        self
    }

    /// カラムを追加
    ///
    /// 同名のカラムが既にある場合は位置を保ったまま置き換え、以前の定義を返します。
    pub fn insert(&mut self, name: impl Into<String>, field: FieldSchema) -> Option<FieldSchema> {
        let name = name.into();
        match self.columns.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, field)),
            None => {
                self.columns.push((name, field));
                None
            }
        }
    }

    /// 指定カラムの定義を取得
    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.columns
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, field)| field)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// 格納順にカラムを走査
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldSchema)> {
        self.columns
            .iter()
            .map(|(name, field)| (name.as_str(), field))
    }

    /// 格納順のカラム名
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// CREATE TABLEに出力されるカラム（予約済みタイムスタンプ列を除く）
    pub fn creatable_columns(&self) -> impl Iterator<Item = (&str, &FieldSchema)> {
        self.iter()
            .filter(|(name, _)| !is_reserved_timestamp_column(name))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl FromIterator<(String, FieldSchema)> for TableSchema {
    fn from_iter<I: IntoIterator<Item = (String, FieldSchema)>>(iter: I) -> Self {
        let mut schema = TableSchema::new();
        for (name, field) in iter {
            schema.insert(name, field);
        }
        schema
    }
}

// 永続化形式ではカラム名をキーとするオブジェクトとして出力し、キー順をカラム順とする
impl Serialize for TableSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, field) in &self.columns {
            map.serialize_entry(name, field)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TableSchema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableSchemaVisitor;

        impl<'de> Visitor<'de> for TableSchemaVisitor {
            type Value = TableSchema;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of column name to field schema")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut schema = TableSchema::new();
                while let Some((name, field)) = access.next_entry::<String, FieldSchema>()? {
                    if schema.contains(&name) {
                        return Err(de::Error::custom(format!(
                            "duplicate column '{}'",
                            name
                        )));
                    }
                    schema.columns.push((name, field));
                }
                Ok(schema)
            }
        }

        deserializer.deserialize_map(TableSchemaVisitor)
    }
}

/// テーブルメタデータ
///
/// メタデータストア内の1テーブル分のレコード。
#[derive(Debug, Clone, PartialEq)]
pub struct TableMetadata {
    /// テーブル名（ストアのキー）
    pub name: String,
    /// 順序付きスキーマ
    pub schema: TableSchema,
    /// 最終同期日時
    pub recorded_at: DateTime<Utc>,
    /// 自由記述のメモ
    pub notes: String,
}

impl TableMetadata {
    /// 現在時刻で記録されたメタデータを作成
    pub fn new(name: impl Into<String>, schema: TableSchema) -> Self {
        Self {
            name: name.into(),
            schema,
            recorded_at: Utc::now(),
            notes: String::new(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}
