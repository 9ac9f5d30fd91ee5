use anyhow::{Context, Result};
use clap::Parser;
use colored::control as color_control;
use std::env;
use std::path::PathBuf;
use std::process;
use tablekeeper::cli::commands::forget::{ForgetCommand, ForgetCommandHandler};
use tablekeeper::cli::commands::init::{InitCommand, InitCommandHandler};
use tablekeeper::cli::commands::show::{ShowCommand, ShowCommandHandler};
use tablekeeper::cli::commands::status::{StatusCommand, StatusCommandHandler};
use tablekeeper::cli::commands::sync::{SyncCommand, SyncCommandHandler};
use tablekeeper::cli::{Cli, Commands};
use tablekeeper::core::config::Dialect;
use tablekeeper::core::naming::APP_NAME;
use tracing_subscriber::EnvFilter;

fn main() {
    sqlx::any::install_default_drivers();

    // CLIをパースして実行
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // 非同期ランタイムを作成して実行
    let runtime = tokio::runtime::Runtime::new()
        .context("Failed to create Tokio runtime")
        .unwrap_or_else(|e| {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        });

    let result = runtime.block_on(run_command(cli));

    match result {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

/// ログ出力を初期化する（RUST_LOGが優先、標準エラーへ出力）
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let directive = format!("{}={}", APP_NAME, level);

    let filter = match directive.parse() {
        Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
        Err(_) => EnvFilter::from_default_env(),
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// コマンドを実行する
async fn run_command(cli: Cli) -> Result<String> {
    // --no-color フラグの処理
    if cli.no_color {
        color_control::set_override(false);
    }

    // プロジェクトのルートパスを取得
    let project_path = env::current_dir()?;

    // --config フラグの処理（絶対パスに変換）
    let config_path: Option<PathBuf> = cli.config.map(|p| {
        if p.is_absolute() {
            p
        } else {
            project_path.join(p)
        }
    });

    match cli.command {
        Commands::Init {
            dialect,
            database,
            force,
        } => {
            let dialect: Dialect = dialect.parse()?;
            let database_name = database.unwrap_or_else(|| match dialect {
                Dialect::MySQL => format!("{}_db", APP_NAME),
                Dialect::SQLite => format!("{}.db", APP_NAME),
            });
            let handler = InitCommandHandler::new();
            let command = InitCommand {
                project_path,
                dialect,
                force,
                database_name,
            };
            handler.execute(&command)?;
            Ok("Project initialized.".to_string())
        }

        Commands::Sync => {
            let handler = SyncCommandHandler::new();
            let command = SyncCommand {
                project_path,
                config_path,
                env: cli.env,
                dsn: cli.dsn,
                format: cli.format,
            };
            handler.execute(&command).await
        }

        Commands::Status => {
            let handler = StatusCommandHandler::new();
            let command = StatusCommand {
                project_path,
                config_path,
                env: cli.env,
                dsn: cli.dsn,
                format: cli.format,
            };
            handler.execute(&command).await
        }

        Commands::Show { table } => {
            let handler = ShowCommandHandler::new();
            let command = ShowCommand {
                project_path,
                config_path,
                table,
                format: cli.format,
            };
            handler.execute(&command)
        }

        Commands::Forget { table } => {
            let handler = ForgetCommandHandler::new();
            let command = ForgetCommand {
                project_path,
                config_path,
                table,
                format: cli.format,
            };
            handler.execute(&command)
        }
    }
}
