// initコマンドハンドラー
//
// プロジェクトの初期化処理を実装します。
// - デフォルト設定ファイルの生成（.tablekeeper.yaml）
// - 空のメタデータファイルの作成（activetables.json）
// - 初期化済みプロジェクトの検出

use crate::core::config::{Config, DatabaseConfig, Dialect};
use crate::core::naming::{DEFAULT_ENVIRONMENT, METADATA_FILE};
use crate::services::config_loader::ConfigLoader;
use crate::services::metadata_store::MetadataStore;
use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// initコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct InitCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// データベース方言
    pub dialect: Dialect,
    /// 強制的に初期化（既存の設定を上書き）
    pub force: bool,
    /// データベース名
    pub database_name: String,
}

/// initコマンドハンドラー
#[derive(Debug, Default)]
pub struct InitCommandHandler {}

impl InitCommandHandler {
    /// 新しいInitCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// initコマンドを実行
    ///
    /// 既存のメタデータファイルは上書きしません。
    pub fn execute(&self, command: &InitCommand) -> Result<()> {
        if self.is_already_initialized(&command.project_path) && !command.force {
            return Err(anyhow!(
                "Project is already initialized. Use --force option to force re-initialization."
            ));
        }

        let config = self.default_config(command);
        let config_path = command.project_path.join(Config::DEFAULT_CONFIG_PATH);
        ConfigLoader::write_file(&config_path, &config)?;
        info!(path = ?config_path, dialect = %command.dialect, "Wrote config file");

        let metadata_path = command.project_path.join(&config.metadata_file);
        MetadataStore::open(&metadata_path)
            .with_context(|| format!("Failed to create metadata file: {:?}", metadata_path))?;

        Ok(())
    }

    /// プロジェクトが既に初期化されているかチェック
    pub fn is_already_initialized(&self, project_path: &Path) -> bool {
        project_path.join(Config::DEFAULT_CONFIG_PATH).exists()
    }

    /// 既定の設定を組み立てる
    pub fn default_config(&self, command: &InitCommand) -> Config {
        let db_config = DatabaseConfig {
            host: "localhost".to_string(),
            port: None,
            database: command.database_name.clone(),
            user: match command.dialect {
                Dialect::MySQL => Some("root".to_string()),
                Dialect::SQLite => None,
            },
            password: None,
            timeout: Some(30),
            create_database: command.dialect == Dialect::MySQL,
        };

        let mut environments = HashMap::new();
        environments.insert(DEFAULT_ENVIRONMENT.to_string(), db_config);

        Config {
            version: "1.0".to_string(),
            dialect: command.dialect,
            metadata_file: PathBuf::from(METADATA_FILE),
            environments,
        }
    }
}
