// showコマンドハンドラー
//
// メタデータファイルに記録されたテーブルのスキーマを表示します。
// データベースへは接続しません。

use crate::cli::command_context::CommandContext;
use crate::cli::commands::{render_output, CommandOutput};
use crate::cli::OutputFormat;
use crate::core::identifier::validate_identifier;
use crate::core::schema::{is_reserved_timestamp_column, TableMetadata};
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

/// カラム1件分の表示用エントリ
#[derive(Debug, Clone, Serialize)]
pub struct ColumnEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    pub null: String,
    pub key: String,
    pub extra: String,
}

/// showコマンドの出力構造体
#[derive(Debug, Clone, Serialize)]
pub struct ShowOutput {
    pub table: String,
    pub recorded_at: DateTime<Utc>,
    pub notes: String,
    pub columns: Vec<ColumnEntry>,
}

impl ShowOutput {
    fn from_metadata(metadata: &TableMetadata) -> Self {
        let columns = metadata
            .schema
            .iter()
            .map(|(name, field)| ColumnEntry {
                name: name.to_string(),
                column_type: field.column_type.clone(),
                null: field.nullable.as_marker().to_string(),
                key: field.key.as_marker().to_string(),
                extra: field.extra.clone(),
            })
            .collect();

        Self {
            table: metadata.name.clone(),
            recorded_at: metadata.recorded_at,
            notes: metadata.notes.clone(),
            columns,
        }
    }
}

impl CommandOutput for ShowOutput {
    fn to_text(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("{}\n", format!("=== {} ===", self.table).bold()));
        output.push_str(&format!("Recorded at: {}\n", self.recorded_at.to_rfc3339()));
        if !self.notes.is_empty() {
            output.push_str(&format!("Notes: {}\n", self.notes));
        }
        output.push('\n');

        output.push_str(&format!(
            "{:<24} {:<32} {:<6} {:<6} {}\n",
            "Field", "Type", "Null", "Key", "Extra"
        ));
        output.push_str(&format!("{}\n", "-".repeat(80)));
        for column in &self.columns {
            let line = format!(
                "{:<24} {:<32} {:<6} {:<6} {}",
                column.name, column.column_type, column.null, column.key, column.extra
            );
            // 作成時に省略されるカラム
            if is_reserved_timestamp_column(&column.name) {
                output.push_str(&format!("{}\n", line.dimmed()));
            } else {
                output.push_str(&format!("{}\n", line));
            }
        }

        output.trim_end().to_string()
    }
}

/// showコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct ShowCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// カスタム設定ファイルパス
    pub config_path: Option<PathBuf>,
    /// テーブル名
    pub table: String,
    /// 出力フォーマット
    pub format: OutputFormat,
}

/// showコマンドハンドラー
#[derive(Debug, Default)]
pub struct ShowCommandHandler {}

impl ShowCommandHandler {
    /// 新しいShowCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// showコマンドを実行
    pub fn execute(&self, command: &ShowCommand) -> Result<String> {
        validate_identifier(&command.table)?;

        let context = CommandContext::load_with_config(
            command.project_path.clone(),
            command.config_path.clone(),
        )?;
        let store = context.open_store()?;

        let metadata = store.get(&command.table).ok_or_else(|| {
            anyhow!(
                "Table '{}' is not recorded in {:?}",
                command.table,
                store.path()
            )
        })?;

        render_output(&ShowOutput::from_metadata(&metadata), &command.format)
    }
}
