// エラー型定義
//
// ライブラリ全体で使用されるカスタムエラー型を提供します。
// thiserrorを使用して、DatabaseError, PersistenceError, ConfigError, ReconcileError を定義します。

use thiserror::Error;

/// データベースエラー
///
/// 接続・クエリ実行・テーブル参照時に発生するエラーを表現します。
#[derive(Debug, Clone, Error)]
pub enum DatabaseError {
    /// Connection error
    #[error("Database connection error: {message} (cause: {cause})")]
    Connection {
        /// エラーメッセージ
        message: String,
        /// エラー原因
        cause: String,
    },

    /// Query execution error
    #[error("Query execution error: {message}")]
    Query {
        /// エラーメッセージ
        message: String,
        /// 失敗したSQL
        sql: Option<String>,
        /// SQLSTATEコード（ドライバーが返した場合）
        code: Option<String>,
    },

    /// Table not found
    #[error("Table not found: {name}")]
    TableNotFound {
        /// テーブル名
        name: String,
    },

    /// Invalid identifier error
    #[error("Invalid identifier '{name}': {reason}")]
    InvalidIdentifier {
        /// 識別子
        name: String,
        /// 不正な理由
        reason: String,
    },
}

impl DatabaseError {
    /// SQL付きのクエリエラーを作成
    pub fn query(message: impl Into<String>, sql: impl Into<String>) -> Self {
        DatabaseError::Query {
            message: message.into(),
            sql: Some(sql.into()),
            code: None,
        }
    }

    /// 接続エラーかどうか
    pub fn is_connection(&self) -> bool {
        matches!(self, DatabaseError::Connection { .. })
    }

    /// クエリエラーかどうか
    pub fn is_query(&self) -> bool {
        matches!(self, DatabaseError::Query { .. })
    }

    /// テーブル不在エラーかどうか
    pub fn is_table_not_found(&self) -> bool {
        matches!(self, DatabaseError::TableNotFound { .. })
    }

    /// 識別子不正エラーかどうか
    pub fn is_invalid_identifier(&self) -> bool {
        matches!(self, DatabaseError::InvalidIdentifier { .. })
    }

    /// SQLSTATEコードを取得
    pub fn code(&self) -> Option<&str> {
        match self {
            DatabaseError::Query { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

/// 永続化エラー
///
/// メタデータファイルの読み書き時に発生するエラーを表現します。
#[derive(Debug, Clone, Error)]
pub enum PersistenceError {
    /// File read error
    #[error("Failed to read metadata file: {path} (cause: {cause})")]
    FileRead {
        /// ファイルパス
        path: String,
        /// エラー原因
        cause: String,
    },

    /// File write error
    #[error("Failed to write metadata file: {path} (cause: {cause})")]
    FileWrite {
        /// ファイルパス
        path: String,
        /// エラー原因
        cause: String,
    },

    /// Parse error
    #[error("Failed to parse metadata file: {path} (cause: {cause})")]
    Parse {
        /// ファイルパス
        path: String,
        /// エラー原因
        cause: String,
    },

    /// Serialize error
    #[error("Failed to serialize metadata: {cause}")]
    Serialize {
        /// エラー原因
        cause: String,
    },
}

impl PersistenceError {
    /// ファイル読み込みエラーかどうか
    pub fn is_file_read(&self) -> bool {
        matches!(self, PersistenceError::FileRead { .. })
    }

    /// ファイル書き込みエラーかどうか
    pub fn is_file_write(&self) -> bool {
        matches!(self, PersistenceError::FileWrite { .. })
    }

    /// パースエラーかどうか
    pub fn is_parse(&self) -> bool {
        matches!(self, PersistenceError::Parse { .. })
    }
}

/// 設定エラー
///
/// I/Oを行う前に検出される致命的な設定不備を表現します。
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Unsupported dialect
    #[error("Unsupported database dialect: {name}. Please specify one of: mysql, sqlite.")]
    UnsupportedDialect {
        /// 指定された方言名
        name: String,
    },

    /// Malformed connection description
    #[error("Invalid connection description '{value}': {reason}")]
    InvalidConnection {
        /// 指定された値
        value: String,
        /// 不正な理由
        reason: String,
    },

    /// Missing environment
    #[error("Environment '{name}' not found. Available environments: {available:?}")]
    MissingEnvironment {
        /// 環境名
        name: String,
        /// 定義済みの環境名
        available: Vec<String>,
    },
}

impl ConfigError {
    /// 未対応方言エラーかどうか
    pub fn is_unsupported_dialect(&self) -> bool {
        matches!(self, ConfigError::UnsupportedDialect { .. })
    }

    /// 接続記述不正エラーかどうか
    pub fn is_invalid_connection(&self) -> bool {
        matches!(self, ConfigError::InvalidConnection { .. })
    }
}

/// 照合パス全体を中断するエラー
///
/// テーブル単位の失敗はレポートに記録されるため、ここに現れるのは
/// テーブル一覧の取得失敗とメタデータの永続化失敗のみです。
#[derive(Debug, Clone, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
