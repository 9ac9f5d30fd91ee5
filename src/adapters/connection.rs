// 接続ケイパビリティ
//
// 照合エンジンと方言層から見たデータベース接続は
// 「文を実行する」「行を取得する」の2操作だけに限定する。

use crate::core::error::DatabaseError;
use async_trait::async_trait;
use sqlx::any::AnyRow;
use sqlx::{AnyPool, Row};

/// クエリ結果の1行
///
/// 各カラムをNULL許容のテキストとして位置で保持します。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryRow {
    values: Vec<Option<String>>,
}

impl QueryRow {
    /// 値のリストから行を作成
    pub fn new(values: Vec<Option<String>>) -> Self {
        Self { values }
    }

    /// テキスト値のみから行を作成
    pub fn from_texts<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(|v| Some(v.into())).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// NULL許容のテキスト値を取得
    pub fn optional_text(&self, index: usize) -> Result<Option<&str>, DatabaseError> {
        self.values
            .get(index)
            .map(|value| value.as_deref())
            .ok_or_else(|| DatabaseError::Query {
                message: format!(
                    "column index {} out of range (row has {} columns)",
                    index,
                    self.values.len()
                ),
                sql: None,
                code: None,
            })
    }

    /// テキスト値を取得（NULLは空文字列）
    pub fn text(&self, index: usize) -> Result<&str, DatabaseError> {
        Ok(self.optional_text(index)?.unwrap_or(""))
    }

    /// 整数値を取得（NULLは0）
    pub fn integer(&self, index: usize) -> Result<i64, DatabaseError> {
        let text = self.text(index)?;
        if text.is_empty() {
            return Ok(0);
        }
        text.trim().parse::<i64>().map_err(|e| DatabaseError::Query {
            message: format!("column {} is not an integer ('{}'): {}", index, text, e),
            sql: None,
            code: None,
        })
    }
}

/// データベース接続インターフェース
///
/// 1回の照合パスの間は単一の所有者が使用する前提です。
#[async_trait]
pub trait Connection: Send + Sync {
    /// 文を実行し、影響を受けた行数を返す
    async fn execute(&self, sql: &str) -> Result<u64, DatabaseError>;

    /// クエリを実行し、全行を返す
    async fn query(&self, sql: &str) -> Result<Vec<QueryRow>, DatabaseError>;

    /// クエリを実行し、先頭行を返す（行がなければNone）
    async fn query_optional(&self, sql: &str) -> Result<Option<QueryRow>, DatabaseError> {
        Ok(self.query(sql).await?.into_iter().next())
    }
}

/// SQLxの接続プールを使用した接続
///
/// 文はプリペアドステートメントを使わずにそのまま送信し、
/// 全カラムをテキストとしてデコードします。
#[derive(Debug, Clone)]
pub struct SqlxConnection {
    pool: AnyPool,
}

impl SqlxConnection {
    /// 接続プールをラップ
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    /// 内部の接続プールを取得
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// 接続プールを閉じる
    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl Connection for SqlxConnection {
    async fn execute(&self, sql: &str) -> Result<u64, DatabaseError> {
        sqlx::raw_sql(sql)
            .execute(&self.pool)
            .await
            .map(|result| result.rows_affected())
            .map_err(|e| map_sqlx_error(e, sql))
    }

    async fn query(&self, sql: &str) -> Result<Vec<QueryRow>, DatabaseError> {
        let rows = sqlx::raw_sql(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, sql))?;

        Ok(rows.iter().map(decode_row).collect())
    }
}

/// SQLxのエラーをDatabaseErrorに変換
pub(crate) fn map_sqlx_error(error: sqlx::Error, sql: &str) -> DatabaseError {
    let lost_connection = matches!(
        error,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    );
    if lost_connection {
        return DatabaseError::Connection {
            message: "Failed to execute statement".to_string(),
            cause: error.to_string(),
        };
    }

    match error {
        sqlx::Error::Database(db_error) => DatabaseError::Query {
            message: db_error.message().to_string(),
            sql: Some(sql.to_string()),
            code: db_error.code().map(|code| code.into_owned()),
        },
        other => DatabaseError::Query {
            message: other.to_string(),
            sql: Some(sql.to_string()),
            code: None,
        },
    }
}

fn decode_row(row: &AnyRow) -> QueryRow {
    QueryRow::new((0..row.len()).map(|index| decode_value(row, index)).collect())
}

// Anyドライバーは型の一致を要求するため、テキスト・整数・実数・バイト列の順に試す
fn decode_value(row: &AnyRow, index: usize) -> Option<String> {
    if let Ok(value) = row.try_get::<Option<String>, _>(index) {
        return value;
    }
    if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
        return value.map(|v| v.to_string());
    }
    if let Ok(value) = row.try_get::<Option<f64>, _>(index) {
        return value.map(|v| v.to_string());
    }
    if let Ok(value) = row.try_get::<Option<bool>, _>(index) {
        return value.map(|v| if v { "1".to_string() } else { "0".to_string() });
    }
    if let Ok(value) = row.try_get::<Option<Vec<u8>>, _>(index) {
        return value.map(|bytes| String::from_utf8_lossy(&bytes).into_owned());
    }
    None
}
