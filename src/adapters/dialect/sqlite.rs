// SQLite方言
//
// sqlite_master と PRAGMA を使用してスキーマを取得し、
// SQLite用のCREATE TABLE文を生成します。

use crate::adapters::connection::Connection;
use crate::adapters::dialect::{build_create_table, SchemaDialect};
use crate::core::config::Dialect;
use crate::core::error::DatabaseError;
use crate::core::schema::{FieldSchema, KeyKind, Nullable, TableSchema};
use async_trait::async_trait;
use std::collections::HashSet;
use tracing::debug;

/// SQLite方言
#[derive(Debug, Clone, Default)]
pub struct SqliteDialect {}

impl SqliteDialect {
    /// 新しいSqliteDialectを作成
    pub fn new() -> Self {
        Self {}
    }

    /// 単一カラムのユニーク制約を持つカラム名を取得
    async fn unique_columns(
        &self,
        conn: &dyn Connection,
        name: &str,
    ) -> Result<HashSet<String>, DatabaseError> {
        // seq, name, unique, origin, partial
        let indexes = conn.query(&format!("PRAGMA index_list({});", name)).await?;

        let mut columns = HashSet::new();
        for index in &indexes {
            if index.integer(2)? != 1 || index.text(3)? == "pk" {
                continue;
            }

            // seqno, cid, name
            let index_name = index.text(1)?;
            let info = conn
                .query(&format!("PRAGMA index_info(\"{}\");", index_name))
                .await?;
            if let [only] = info.as_slice() {
                columns.insert(only.text(2)?.to_string());
            }
        }

        Ok(columns)
    }
}

#[async_trait]
impl SchemaDialect for SqliteDialect {
    fn dialect(&self) -> Dialect {
        Dialect::SQLite
    }

    async fn list_tables(&self, conn: &dyn Connection) -> Result<Vec<String>, DatabaseError> {
        let rows = conn
            .query(
                "SELECT name FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
                 ORDER BY name;",
            )
            .await?;

        rows.iter()
            .map(|row| row.text(0).map(str::to_string))
            .collect()
    }

    async fn describe_table(
        &self,
        conn: &dyn Connection,
        name: &str,
    ) -> Result<TableSchema, DatabaseError> {
        let sql = format!("PRAGMA table_info({});", name);
        debug!(sql = %sql, "Describing table");

        // cid, name, type, notnull, dflt_value, pk
        let rows = conn.query(&sql).await?;
        if rows.is_empty() {
            return Err(DatabaseError::TableNotFound {
                name: name.to_string(),
            });
        }

        let unique_columns = self.unique_columns(conn, name).await?;

        let mut schema = TableSchema::new();
        for row in &rows {
            let column = row.text(1)?;
            let nullable = if row.integer(3)? != 0 {
                Nullable::NotNull
            } else {
                Nullable::Null
            };
            let key = if row.integer(5)? > 0 {
                KeyKind::Primary
            } else if unique_columns.contains(column) {
                KeyKind::Unique
            } else {
                KeyKind::None
            };

            schema.insert(
                column,
                FieldSchema {
                    column_type: row.text(2)?.to_string(),
                    nullable,
                    key,
                    extra: String::new(),
                },
            );
        }

        Ok(schema)
    }

    async fn table_exists(
        &self,
        conn: &dyn Connection,
        name: &str,
    ) -> Result<bool, DatabaseError> {
        let sql = format!(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = '{}';",
            name
        );
        Ok(conn.query_optional(&sql).await?.is_some())
    }

    fn generate_create_table(&self, name: &str, schema: &TableSchema) -> String {
        build_create_table(name, schema, render_extra)
    }
}

/// MySQL由来のextra修飾子をSQLiteの表記に変換
fn render_extra(extra: &str) -> String {
    if extra.eq_ignore_ascii_case("auto_increment") {
        "AUTOINCREMENT".to_string()
    } else {
        extra.to_string()
    }
}
