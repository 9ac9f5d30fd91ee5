// syncコマンドハンドラー
//
// データベースへ接続し、照合を1パス実行して結果を表示します。

use crate::cli::command_context::CommandContext;
use crate::cli::commands::{render_output, CommandOutput};
use crate::cli::OutputFormat;
use crate::services::schema_reconciler::ReconcileReport;
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

/// syncコマンドの出力構造体
#[derive(Debug, Clone, Serialize)]
pub struct SyncOutput {
    #[serde(flatten)]
    pub report: ReconcileReport,
}

impl CommandOutput for SyncOutput {
    fn to_text(&self) -> String {
        format_report(&self.report)
    }
}

/// syncコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct SyncCommand {
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

/// syncコマンドハンドラー
#[derive(Debug, Default)]
pub struct SyncCommandHandler {}

impl SyncCommandHandler {
    /// 新しいSyncCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// syncコマンドを実行
    pub async fn execute(&self, command: &SyncCommand) -> Result<String> {
        let context = CommandContext::load_with_config(
            command.project_path.clone(),
            command.config_path.clone(),
        )?;

        let reconciler = context.reconciler()?;
        let connection = context.connect(&command.env, command.dsn.as_deref()).await?;

        let report = reconciler
            .reconcile(&connection)
            .await
            .with_context(|| "Reconciliation failed");
        connection.close().await;

        render_output(&SyncOutput { report: report? }, &command.format)
    }
}

/// 照合結果をテキストに整形
pub fn format_report(report: &ReconcileReport) -> String {
    let mut output = String::new();
    output.push_str(&format!("{}\n", "=== Sync Result ===".bold()));

    if report.is_noop() && !report.has_failures() && report.skipped.is_empty() {
        output.push_str(&format!("{}\n", "Already in sync.".green()));
        return output;
    }

    for name in &report.adopted {
        output.push_str(&format!("  {} {}\n", "recorded".green(), name));
    }
    for name in &report.created {
        output.push_str(&format!("  {} {}\n", "created ".green(), name));
    }
    for name in &report.skipped {
        output.push_str(&format!("  {} {}\n", "skipped ".yellow(), name));
    }
    for failure in &report.failures {
        output.push_str(&format!(
            "  {} {} ({}): {}\n",
            "failed  ".red(),
            failure.table,
            failure.stage,
            failure.message
        ));
    }

    let summary = format!(
        "Recorded: {}, Created: {}, Skipped: {}, Failed: {}",
        report.adopted.len(),
        report.created.len(),
        report.skipped.len(),
        report.failures.len()
    );
    output.push('\n');
    if report.has_failures() {
        output.push_str(&summary.red().bold().to_string());
    } else {
        output.push_str(&summary.bold().to_string());
    }

    output
}
