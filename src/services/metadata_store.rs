// メタデータストア
//
// テーブル名から最終既知スキーマへの対応を保持し、変更のたびに
// JSONスナップショットとしてディスクへ書き出す。
// 全ての公開操作は単一のMutexで直列化される。

use crate::core::error::PersistenceError;
use crate::core::schema::{TableMetadata, TableSchema};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// メタデータファイル上の1テーブル分のレコード
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredTable {
    schema: TableSchema,
    #[serde(default = "unknown_timestamp", deserialize_with = "lenient_timestamp")]
    timestamp: DateTime<Utc>,
    #[serde(default)]
    details: String,
}

fn unknown_timestamp() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

// 書き出しはRFC 3339だが、既存ファイルには任意の文字列やnullが入りうる。
// 解釈できない値はエポックとして読む
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .and_then(|text| DateTime::parse_from_rfc3339(text.trim()).ok())
        .map(|parsed| parsed.with_timezone(&Utc))
        .unwrap_or_else(unknown_timestamp))
}

impl StoredTable {
    fn from_metadata(metadata: &TableMetadata) -> Self {
        Self {
            schema: metadata.schema.clone(),
            timestamp: metadata.recorded_at,
            details: metadata.notes.clone(),
        }
    }

    fn into_metadata(self, name: &str) -> TableMetadata {
        TableMetadata {
            name: name.to_string(),
            schema: self.schema,
            recorded_at: self.timestamp,
            notes: self.details,
        }
    }
}

type TableMap = BTreeMap<String, StoredTable>;

/// メタデータストア
///
/// アプリケーションの組み立て時に一度だけ作成し、参照を各コンポーネントへ渡します。
#[derive(Debug)]
pub struct MetadataStore {
    path: PathBuf,
    tables: Mutex<TableMap>,
}

impl MetadataStore {
    /// メタデータファイルを読み込んでストアを作成
    ///
    /// ファイルが存在しない場合は空のレコードを書き出してから返します。
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let path = path.into();

        let tables = if path.exists() {
            let tables = load_tables(&path)?;
            debug!(path = %path.display(), tables = tables.len(), "Loaded metadata file");
            tables
        } else {
            let tables = TableMap::new();
            write_tables(&path, &tables)?;
            info!(path = %path.display(), "Created empty metadata file");
            tables
        };

        Ok(Self {
            path,
            tables: Mutex::new(tables),
        })
    }

    /// メタデータファイルのパス
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// テーブルのメタデータを取得（コピーを返す）
    pub fn get(&self, name: &str) -> Option<TableMetadata> {
        self.lock()
            .get(name)
            .cloned()
            .map(|stored| stored.into_metadata(name))
    }

    /// メタデータを挿入または置換し、ファイルへ書き出す
    ///
    /// 書き出しに失敗した場合、メモリ上の状態は変更されません。
    pub fn upsert(&self, name: &str, metadata: TableMetadata) -> Result<(), PersistenceError> {
        let mut guard = self.lock();

        let mut next = guard.clone();
        next.insert(name.to_string(), StoredTable::from_metadata(&metadata));
        write_tables(&self.path, &next)?;

        *guard = next;
        debug!(table = %name, "Upserted table metadata");
        Ok(())
    }

    /// メタデータを削除し、ファイルへ書き出す
    ///
    /// 削除したレコードを返します。存在しない場合は何も書き出しません。
    pub fn remove(&self, name: &str) -> Result<Option<TableMetadata>, PersistenceError> {
        let mut guard = self.lock();

        if !guard.contains_key(name) {
            return Ok(None);
        }

        let mut next = guard.clone();
        let removed = next.remove(name);
        write_tables(&self.path, &next)?;

        *guard = next;
        debug!(table = %name, "Removed table metadata");
        Ok(removed.map(|stored| stored.into_metadata(name)))
    }

    /// 現在のテーブル名のスナップショット
    pub fn all_names(&self) -> BTreeSet<String> {
        self.lock().keys().cloned().collect()
    }

    /// 全メタデータのスナップショット（テーブル名順）
    pub fn snapshot(&self) -> Vec<TableMetadata> {
        self.lock()
            .iter()
            .map(|(name, stored)| stored.clone().into_metadata(name))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // 変更は書き出し成功後にのみ反映されるため、ポイズン後の内容も一貫している
    fn lock(&self) -> MutexGuard<'_, TableMap> {
        self.tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn load_tables(path: &Path) -> Result<TableMap, PersistenceError> {
    let content = std::fs::read_to_string(path).map_err(|e| PersistenceError::FileRead {
        path: path.display().to_string(),
        cause: e.to_string(),
    })?;

    if content.trim().is_empty() {
        return Ok(TableMap::new());
    }

    serde_json::from_str(&content).map_err(|e| PersistenceError::Parse {
        path: path.display().to_string(),
        cause: e.to_string(),
    })
}

// 同じディレクトリの一時ファイルに書いてからリネームする
fn write_tables(path: &Path, tables: &TableMap) -> Result<(), PersistenceError> {
    let json = serde_json::to_string_pretty(tables).map_err(|e| PersistenceError::Serialize {
        cause: e.to_string(),
    })?;

    let write_error = |cause: String| PersistenceError::FileWrite {
        path: path.display().to_string(),
        cause,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(|e| write_error(e.to_string()))?;
    file.write_all(json.as_bytes())
        .and_then(|_| file.as_file().sync_all())
        .map_err(|e| write_error(e.to_string()))?;
    file.persist(path)
        .map_err(|e| write_error(e.error.to_string()))?;

    Ok(())
}
