// MySQL方言
//
// SHOW TABLES / DESC / SHOW TABLES LIKE を使用してスキーマを取得し、
// MySQL用のCREATE TABLE文を生成します。

use crate::adapters::connection::Connection;
use crate::adapters::dialect::{build_create_table, SchemaDialect};
use crate::core::config::Dialect;
use crate::core::error::DatabaseError;
use crate::core::schema::{FieldSchema, KeyKind, Nullable, TableSchema};
use async_trait::async_trait;
use tracing::debug;

/// ER_NO_SUCH_TABLE のSQLSTATE
const NO_SUCH_TABLE_SQLSTATE: &str = "42S02";

/// MySQL方言
#[derive(Debug, Clone, Default)]
pub struct MysqlDialect {}

impl MysqlDialect {
    /// 新しいMysqlDialectを作成
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl SchemaDialect for MysqlDialect {
    fn dialect(&self) -> Dialect {
        Dialect::MySQL
    }

    async fn list_tables(&self, conn: &dyn Connection) -> Result<Vec<String>, DatabaseError> {
        let rows = conn.query("SHOW TABLES;").await?;

        rows.iter()
            .map(|row| row.text(0).map(str::to_string))
            .collect()
    }

    async fn describe_table(
        &self,
        conn: &dyn Connection,
        name: &str,
    ) -> Result<TableSchema, DatabaseError> {
        let sql = format!("DESC {};", name);
        debug!(sql = %sql, "Describing table");

        let rows = match conn.query(&sql).await {
            Ok(rows) => rows,
            Err(e) if e.code() == Some(NO_SUCH_TABLE_SQLSTATE) => {
                return Err(DatabaseError::TableNotFound {
                    name: name.to_string(),
                })
            }
            Err(e) => return Err(e),
        };

        if rows.is_empty() {
            return Err(DatabaseError::TableNotFound {
                name: name.to_string(),
            });
        }

        // Field, Type, Null, Key, Default, Extra
        let mut schema = TableSchema::new();
        for row in &rows {
            let field = FieldSchema {
                column_type: row.text(1)?.to_string(),
                nullable: Nullable::from_marker(row.text(2)?),
                key: KeyKind::from_marker(row.text(3)?),
                extra: row.text(5)?.to_string(),
            };
            schema.insert(row.text(0)?, field);
        }

        Ok(schema)
    }

    async fn table_exists(
        &self,
        conn: &dyn Connection,
        name: &str,
    ) -> Result<bool, DatabaseError> {
        let sql = format!("SHOW TABLES LIKE '{}';", name);
        Ok(conn.query_optional(&sql).await?.is_some())
    }

    fn generate_create_table(&self, name: &str, schema: &TableSchema) -> String {
        build_create_table(name, schema, render_extra)
    }
}

/// DESCのExtra欄をDDLとして有効な表記に変換
///
/// MySQL 8はDEFAULT式を持つカラムに `DEFAULT_GENERATED` を付けるが、
/// これはCREATE TABLEでは使えないため取り除く。
fn render_extra(extra: &str) -> String {
    extra
        .split_whitespace()
        .filter(|token| !token.eq_ignore_ascii_case("DEFAULT_GENERATED"))
        .collect::<Vec<_>>()
        .join(" ")
}
