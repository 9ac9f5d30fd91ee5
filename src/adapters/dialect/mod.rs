// 方言ケイパビリティ
//
// テーブル一覧・スキーマ取得・存在確認・CREATE TABLE生成という
// スキーマ管理の意図を、方言固有の文に変換して実行する。

pub mod mysql;
pub mod sqlite;

use crate::adapters::connection::Connection;
use crate::core::config::Dialect;
use crate::core::error::DatabaseError;
use crate::core::schema::{FieldSchema, KeyKind, TableSchema};
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

pub use mysql::MysqlDialect;
pub use sqlite::SqliteDialect;

/// 方言ケイパビリティ
///
/// 状態を持たない読み取り専用の戦略オブジェクトです。
/// プロセス開始時に一度だけ選択され、全てのテーブルファサードで共有されます。
///
/// 文に埋め込まれる識別子と型文字列はパラメータ化されません。
/// 呼び出し側で検証済みの値のみを渡してください。
#[async_trait]
pub trait SchemaDialect: Debug + Send + Sync {
    /// この実装が対応する方言
    fn dialect(&self) -> Dialect;

    /// テーブル名一覧を取得
    async fn list_tables(&self, conn: &dyn Connection) -> Result<Vec<String>, DatabaseError>;

    /// テーブルの順序付きスキーマを取得
    ///
    /// テーブルが存在しない場合は `DatabaseError::TableNotFound` を返します。
    async fn describe_table(
        &self,
        conn: &dyn Connection,
        name: &str,
    ) -> Result<TableSchema, DatabaseError>;

    /// テーブルの存在を確認（ベストエフォート）
    ///
    /// 照合の正しさは `list_tables` の結果に依存し、この結果には依存しません。
    async fn table_exists(&self, conn: &dyn Connection, name: &str)
        -> Result<bool, DatabaseError>;

    /// CREATE TABLE文を生成
    ///
    /// カラムは格納順に出力され、`created_at` / `updated_at` は常に除外されます。
    fn generate_create_table(&self, name: &str, schema: &TableSchema) -> String;

    /// CREATE TABLE文を実行
    async fn execute_create_table(
        &self,
        conn: &dyn Connection,
        statement: &str,
    ) -> Result<(), DatabaseError> {
        conn.execute(statement).await.map(|_| ())
    }
}

/// 方言に応じたケイパビリティを作成
pub fn create_dialect(dialect: Dialect) -> Arc<dyn SchemaDialect> {
    match dialect {
        Dialect::MySQL => Arc::new(MysqlDialect::new()),
        Dialect::SQLite => Arc::new(SqliteDialect::new()),
    }
}

/// カラム句を生成
///
/// `<name> <type>` に続けて NOT NULL, UNIQUE, PRIMARY KEY, extra の固定順で修飾子を付与します。
pub(crate) fn column_clause(name: &str, field: &FieldSchema, extra: &str) -> String {
    let mut parts = vec![name.to_string(), field.column_type.clone()];

    if field.nullable.is_not_null() {
        parts.push("NOT NULL".to_string());
    }
    if field.key == KeyKind::Unique {
        parts.push("UNIQUE".to_string());
    }
    if field.key == KeyKind::Primary {
        parts.push("PRIMARY KEY".to_string());
    }
    if !extra.is_empty() {
        parts.push(extra.to_string());
    }

    parts.join(" ")
}

/// CREATE TABLE文を組み立てる
///
/// `render_extra` で方言ごとのextra修飾子の表記を差し替えます。
pub(crate) fn build_create_table<F>(name: &str, schema: &TableSchema, render_extra: F) -> String
where
    F: Fn(&str) -> String,
{
    let columns: Vec<String> = schema
        .creatable_columns()
        .map(|(column, field)| column_clause(column, field, &render_extra(&field.extra)))
        .collect();

    format!("CREATE TABLE {} ({});", name, columns.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_clause_modifier_order() {
        let field = FieldSchema::new("int")
            .not_null()
            .primary_key()
            .with_extra("auto_increment");

        assert_eq!(
            column_clause("id", &field, &field.extra),
            "id int NOT NULL PRIMARY KEY auto_increment"
        );
    }

    #[test]
    fn test_column_clause_unique() {
        let field = FieldSchema::new("varchar(255)").not_null().unique();
        assert_eq!(
            column_clause("email", &field, ""),
            "email varchar(255) NOT NULL UNIQUE"
        );
    }

    #[test]
    fn test_column_clause_nullable_emits_no_modifier() {
        let field = FieldSchema::new("text").nullable();
        assert_eq!(column_clause("bio", &field, ""), "bio text");

        let field = FieldSchema::new("text");
        assert_eq!(column_clause("bio", &field, ""), "bio text");
    }

    #[test]
    fn test_create_dialect() {
        assert_eq!(create_dialect(Dialect::MySQL).dialect(), Dialect::MySQL);
        assert_eq!(create_dialect(Dialect::SQLite).dialect(), Dialect::SQLite);
    }

    #[test]
    fn test_build_create_table_skips_reserved_columns() {
        let schema = TableSchema::new()
            .with_column("created_at", FieldSchema::new("timestamp"))
            .with_column("id", FieldSchema::new("int").primary_key())
            .with_column("updated_at", FieldSchema::new("timestamp"));

        let sql = build_create_table("events", &schema, |extra| extra.to_string());
        assert_eq!(sql, "CREATE TABLE events (id int PRIMARY KEY);");
    }
}
