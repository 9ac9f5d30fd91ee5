// statusコマンドハンドラー
//
// 照合計画（取り込み予定・作成予定のテーブル）を表示します。
// データベースとメタデータファイルのどちらも変更しません。

use crate::cli::command_context::CommandContext;
use crate::cli::commands::{render_output, CommandOutput};
use crate::cli::OutputFormat;
use crate::services::schema_reconciler::ReconcilePlan;
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

/// statusコマンドの出力構造体
#[derive(Debug, Clone, Serialize)]
pub struct StatusOutput {
    /// メタデータに記録済みのテーブル数
    pub recorded: usize,
    #[serde(flatten)]
    pub plan: ReconcilePlan,
}

impl CommandOutput for StatusOutput {
    fn to_text(&self) -> String {
        format_plan(self.recorded, &self.plan)
    }
}

/// statusコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct StatusCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// カスタム設定ファイルパス
    pub config_path: Option<PathBuf>,
    /// 環境名
    pub env: String,
    /// 接続記述（環境設定より優先）
    pub dsn: Option<String>,
    /// 出力フォーマット
    pub format: OutputFormat,
}

/// statusコマンドハンドラー
#[derive(Debug, Default)]
pub struct StatusCommandHandler {}

impl StatusCommandHandler {
    /// 新しいStatusCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// statusコマンドを実行
    pub async fn execute(&self, command: &StatusCommand) -> Result<String> {
        let context = CommandContext::load_with_config(
            command.project_path.clone(),
            command.config_path.clone(),
        )?;

        let reconciler = context.reconciler()?;
        let connection = context.connect(&command.env, command.dsn.as_deref()).await?;

        let plan = reconciler
            .plan(&connection)
            .await
            .with_context(|| "Failed to compute reconcile plan");
        connection.close().await;
        let plan = plan?;

        debug!(
            adopt = plan.to_adopt.len(),
            create = plan.to_create.len(),
            "Computed status"
        );

        let output = StatusOutput {
            recorded: reconciler.store().len(),
            plan,
        };
        render_output(&output, &command.format)
    }
}

/// 照合計画をテキストに整形
pub fn format_plan(recorded: usize, plan: &ReconcilePlan) -> String {
    let mut output = String::new();
    output.push_str(&format!("{}\n", "=== Reconcile Status ===".bold()));
    output.push_str(&format!("Recorded tables: {}\n", recorded));
    output.push('\n');

    if plan.is_empty() {
        output.push_str(&"Already in sync.".green().to_string());
        return output;
    }

    if !plan.to_adopt.is_empty() {
        output.push_str(&format!("{}\n", "--- To record (live, not recorded) ---".bold()));
        for name in &plan.to_adopt {
            output.push_str(&format!("  + {}\n", name));
        }
    }
    if !plan.to_create.is_empty() {
        output.push_str(&format!("{}\n", "--- To create (recorded, not live) ---".bold()));
        for name in &plan.to_create {
            output.push_str(&format!("  + {}\n", name));
        }
    }

    output.push_str(&format!(
        "\nRun `tablekeeper sync` to apply {} change(s).",
        plan.to_adopt.len() + plan.to_create.len()
    ));
    output
}
