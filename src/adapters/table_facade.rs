// テーブルファサード
//
// 選択済みの方言ケイパビリティを束ね、呼び出し側に方言非依存のハンドルを提供する。
// 状態やキャッシュは持たず、識別子の検証後に方言へそのまま委譲する。

use crate::adapters::connection::Connection;
use crate::adapters::dialect::{create_dialect, SchemaDialect};
use crate::core::config::Dialect;
use crate::core::error::DatabaseError;
use crate::core::identifier::validate_identifier;
use crate::core::schema::TableSchema;
use std::sync::Arc;
use tracing::debug;

/// テーブルファサード
#[derive(Debug, Clone)]
pub struct TableFacade {
    dialect: Arc<dyn SchemaDialect>,
}

impl TableFacade {
    /// 方言ケイパビリティを束ねたファサードを作成
    pub fn new(dialect: Arc<dyn SchemaDialect>) -> Self {
        Self { dialect }
    }

    /// 方言を指定してファサードを作成
    pub fn for_dialect(dialect: Dialect) -> Self {
        Self::new(create_dialect(dialect))
    }

    /// 束ねている方言ケイパビリティ
    pub fn dialect(&self) -> &dyn SchemaDialect {
        self.dialect.as_ref()
    }

    /// テーブル名一覧を取得
    pub async fn list_tables(&self, conn: &dyn Connection) -> Result<Vec<String>, DatabaseError> {
        self.dialect.list_tables(conn).await
    }

    /// テーブルのスキーマを取得
    pub async fn describe_schema(
        &self,
        conn: &dyn Connection,
        name: &str,
    ) -> Result<TableSchema, DatabaseError> {
        validate_identifier(name)?;
        self.dialect.describe_table(conn, name).await
    }

    /// スキーマからテーブルを作成
    ///
    /// テーブル名と全カラム名を検証してから文を生成します。
    pub async fn create_table(
        &self,
        conn: &dyn Connection,
        name: &str,
        schema: &TableSchema,
    ) -> Result<(), DatabaseError> {
        validate_identifier(name)?;
        for column in schema.column_names() {
            validate_identifier(column)?;
        }

        let statement = self.dialect.generate_create_table(name, schema);
        debug!(table = %name, sql = %statement, "Creating table");
        self.dialect.execute_create_table(conn, &statement).await
    }

    /// テーブルの存在を確認（ベストエフォート）
    pub async fn table_exists_probe(
        &self,
        conn: &dyn Connection,
        name: &str,
    ) -> Result<bool, DatabaseError> {
        validate_identifier(name)?;
        self.dialect.table_exists(conn, name).await
    }
}
