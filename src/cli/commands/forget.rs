// forgetコマンドハンドラー
//
// メタデータファイルからテーブルの記録を削除します。
// ライブのテーブルには触れません。

use crate::cli::command_context::CommandContext;
use crate::cli::commands::{render_output, CommandOutput};
use crate::cli::OutputFormat;
use crate::core::identifier::validate_identifier;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// forgetコマンドの出力構造体
#[derive(Debug, Clone, Serialize)]
pub struct ForgetOutput {
    pub table: String,
    pub removed: bool,
}

impl CommandOutput for ForgetOutput {
    fn to_text(&self) -> String {
        if self.removed {
            format!("Forgot table '{}'.", self.table)
        } else {
            format!("Table '{}' was not recorded.", self.table)
        }
    }
}

/// forgetコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct ForgetCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// カスタム設定ファイルパス
    pub config_path: Option<PathBuf>,
    /// テーブル名
    pub table: String,
    /// 出力フォーマット
    pub format: OutputFormat,
}

/// forgetコマンドハンドラー
#[derive(Debug, Default)]
pub struct ForgetCommandHandler {}

impl ForgetCommandHandler {
    /// 新しいForgetCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// forgetコマンドを実行
    pub fn execute(&self, command: &ForgetCommand) -> Result<String> {
        validate_identifier(&command.table)?;

        let context = CommandContext::load_with_config(
            command.project_path.clone(),
            command.config_path.clone(),
        )?;
        let store = context.open_store()?;

        let removed = store
            .remove(&command.table)
            .with_context(|| format!("Failed to forget table '{}'", command.table))?
            .is_some();
        if removed {
            info!(table = %command.table, "Removed table from metadata");
        }

        let output = ForgetOutput {
            table: command.table.clone(),
            removed,
        };
        render_output(&output, &command.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_output() {
        let output = ForgetOutput {
            table: "users".to_string(),
            removed: true,
        };
        assert_eq!(output.to_text(), "Forgot table 'users'.");

        let output = ForgetOutput {
            table: "users".to_string(),
            removed: false,
        };
        assert_eq!(output.to_text(), "Table 'users' was not recorded.");
    }
}
