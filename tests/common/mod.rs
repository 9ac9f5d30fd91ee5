//! 結合テスト共通のフェイク接続
//!
//! SHOW TABLES / DESC / SHOW TABLES LIKE / CREATE TABLE だけを理解する
//! インメモリのMySQL風データベースです。テーブル単位の失敗を注入できます。

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;
use tablekeeper::adapters::connection::{Connection, QueryRow};
use tablekeeper::core::error::DatabaseError;
use tablekeeper::core::schema::{FieldSchema, KeyKind, Nullable, TableSchema};

#[derive(Debug, Default)]
struct FakeState {
    tables: BTreeMap<String, TableSchema>,
    failing_describe: HashSet<String>,
    vanishing: HashSet<String>,
    failing_create: HashSet<String>,
    fail_listing: bool,
    statements: Vec<String>,
}

/// インメモリのMySQL風データベース
#[derive(Debug, Default)]
pub struct FakeMysql {
    state: Mutex<FakeState>,
}

impl FakeMysql {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(self, name: &str, schema: TableSchema) -> Self {
        self.add_table(name, schema);
        self
    }

    pub fn add_table(&self, name: &str, schema: TableSchema) {
        self.state
            .lock()
            .unwrap()
            .tables
            .insert(name.to_string(), schema);
    }

    pub fn drop_table(&self, name: &str) {
        self.state.lock().unwrap().tables.remove(name);
    }

    /// DESC が一般的なクエリエラーで失敗する
    pub fn fail_describe(&self, name: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_describe
            .insert(name.to_string());
    }

    /// 一覧には出るが DESC 時には消えている
    pub fn vanish_on_describe(&self, name: &str) {
        self.state.lock().unwrap().vanishing.insert(name.to_string());
    }

    pub fn fail_create(&self, name: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_create
            .insert(name.to_string());
    }

    pub fn fail_listing(&self) {
        self.state.lock().unwrap().fail_listing = true;
    }

    pub fn table(&self, name: &str) -> Option<TableSchema> {
        self.state.lock().unwrap().tables.get(name).cloned()
    }

    pub fn table_names(&self) -> Vec<String> {
        self.state.lock().unwrap().tables.keys().cloned().collect()
    }

    /// 実行された全ての文
    pub fn statements(&self) -> Vec<String> {
        self.state.lock().unwrap().statements.clone()
    }

    /// 実行された CREATE TABLE 文
    pub fn create_statements(&self) -> Vec<String> {
        self.statements()
            .into_iter()
            .filter(|sql| sql.starts_with("CREATE TABLE"))
            .collect()
    }

    /// DESC の結果を返す（describe_table と同じ形）
    pub fn described(&self, name: &str) -> Option<TableSchema> {
        self.table(name).map(|schema| {
            schema
                .iter()
                .map(|(column, field)| (column.to_string(), as_described(field)))
                .collect()
        })
    }
}

#[async_trait]
impl Connection for FakeMysql {
    async fn execute(&self, sql: &str) -> Result<u64, DatabaseError> {
        let mut state = self.state.lock().unwrap();
        state.statements.push(sql.to_string());

        let (name, schema) = parse_create_table(sql)
            .ok_or_else(|| DatabaseError::query("You have an error in your SQL syntax", sql))?;

        if state.failing_create.contains(&name) {
            return Err(query_error("Injected create failure", sql, "HY000"));
        }
        if state.tables.contains_key(&name) {
            return Err(query_error(
                &format!("Table '{}' already exists", name),
                sql,
                "42S01",
            ));
        }

        state.tables.insert(name, schema);
        Ok(0)
    }

    async fn query(&self, sql: &str) -> Result<Vec<QueryRow>, DatabaseError> {
        let mut state = self.state.lock().unwrap();
        state.statements.push(sql.to_string());

        if sql == "SHOW TABLES;" {
            if state.fail_listing {
                return Err(DatabaseError::Connection {
                    message: "Lost connection to MySQL server".to_string(),
                    cause: "injected".to_string(),
                });
            }
            return Ok(state
                .tables
                .keys()
                .map(|name| QueryRow::from_texts([name.as_str()]))
                .collect());
        }

        if let Some(name) = strip(sql, "SHOW TABLES LIKE '", "';") {
            return Ok(state
                .tables
                .keys()
                .filter(|table| table.as_str() == name)
                .map(|table| QueryRow::from_texts([table.as_str()]))
                .collect());
        }

        if let Some(name) = strip(sql, "DESC ", ";") {
            if state.failing_describe.contains(name) {
                return Err(query_error("Injected describe failure", sql, "HY000"));
            }
            let schema = match state.tables.get(name) {
                Some(schema) if !state.vanishing.contains(name) => schema,
                _ => {
                    return Err(query_error(
                        &format!("Table 'app.{}' doesn't exist", name),
                        sql,
                        "42S02",
                    ))
                }
            };
            return Ok(schema
                .iter()
                .map(|(column, field)| {
                    let field = as_described(field);
                    QueryRow::new(vec![
                        Some(column.to_string()),
                        Some(field.column_type.clone()),
                        Some(field.nullable.as_marker().to_string()),
                        Some(field.key.as_marker().to_string()),
                        None,
                        Some(field.extra.clone()),
                    ])
                })
                .collect());
        }

        Err(DatabaseError::query("Unsupported statement", sql))
    }
}

fn query_error(message: &str, sql: &str, code: &str) -> DatabaseError {
    DatabaseError::Query {
        message: message.to_string(),
        sql: Some(sql.to_string()),
        code: Some(code.to_string()),
    }
}

fn strip<'a>(sql: &'a str, prefix: &str, suffix: &str) -> Option<&'a str> {
    sql.strip_prefix(prefix)?.strip_suffix(suffix)
}

// MySQLは主キーを常にNOT NULLとして報告し、NULL指定のないカラムはYESになる
fn as_described(field: &FieldSchema) -> FieldSchema {
    let nullable = if field.nullable.is_not_null() || field.key == KeyKind::Primary {
        Nullable::NotNull
    } else {
        Nullable::Null
    };
    FieldSchema {
        nullable,
        ..field.clone()
    }
}

fn parse_create_table(sql: &str) -> Option<(String, TableSchema)> {
    let rest = sql.strip_prefix("CREATE TABLE ")?;
    let open = rest.find(" (")?;
    let name = rest[..open].to_string();
    let body = rest[open + 2..].strip_suffix(");")?;

    let mut schema = TableSchema::new();
    for clause in split_top_level(body) {
        let (column, definition) = clause.trim().split_once(' ')?;
        schema.insert(column, parse_column(definition));
    }
    Some((name, schema))
}

fn split_top_level(body: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_quote = false;

    for c in body.chars() {
        match c {
            '\'' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => depth = depth.saturating_sub(1),
            ',' if !in_quote && depth == 0 => {
                parts.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    if !current.trim().is_empty() {
        parts.push(current);
    }
    parts
}

fn parse_column(definition: &str) -> FieldSchema {
    const MODIFIERS: [&str; 3] = [" NOT NULL", " UNIQUE", " PRIMARY KEY"];

    let padded = format!(" {}", definition);
    let type_end = MODIFIERS
        .iter()
        .filter_map(|m| padded.find(m))
        .min()
        .unwrap_or(padded.len());

    let mut field = FieldSchema::new(padded[..type_end].trim());
    let mut rest = &padded[type_end..];

    if let Some(r) = rest.strip_prefix(" NOT NULL") {
        field = field.not_null();
        rest = r;
    }
    if let Some(r) = rest.strip_prefix(" UNIQUE") {
        field = field.unique();
        rest = r;
    }
    if let Some(r) = rest.strip_prefix(" PRIMARY KEY") {
        field = field.primary_key();
        rest = r;
    }
    field.with_extra(rest.trim())
}

/// よく使うユーザーテーブルのスキーマ
pub fn users_schema() -> TableSchema {
    TableSchema::new()
        .with_column(
            "id",
            FieldSchema::new("int")
                .not_null()
                .primary_key()
                .with_extra("auto_increment"),
        )
        .with_column("email", FieldSchema::new("varchar(255)").not_null().unique())
        .with_column(
            "status",
            FieldSchema::new("enum('active','inactive','banned')").not_null(),
        )
        .with_column("bio", FieldSchema::new("text").nullable())
}

/// 1カラムだけの単純なスキーマ
pub fn simple_schema(column: &str) -> TableSchema {
    TableSchema::new().with_column(column, FieldSchema::new("int").not_null())
}
