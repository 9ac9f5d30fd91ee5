// コマンド共通コンテキスト
//
// 設定ファイル読み込み、ストアの組み立て、DB接続をCLI層で集約する。

use crate::adapters::connection::SqlxConnection;
use crate::adapters::database::DatabaseConnectionService;
use crate::adapters::table_facade::TableFacade;
use crate::core::config::{Config, DatabaseConfig, Dialect};
use crate::services::config_loader::ConfigLoader;
use crate::services::database_config_resolver::DatabaseConfigResolver;
use crate::services::metadata_store::MetadataStore;
use crate::services::schema_reconciler::SchemaReconciler;
use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// CLIコマンド共通の実行コンテキスト
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub project_path: PathBuf,
    pub config_path: PathBuf,
    pub config: Config,
}

impl CommandContext {
    /// プロジェクトルートから設定を読み込んでコンテキストを作成
    pub fn load(project_path: PathBuf) -> Result<Self> {
        Self::load_with_config(project_path, None)
    }

    /// カスタム設定ファイルパスを指定してコンテキストを作成
    pub fn load_with_config(
        project_path: PathBuf,
        custom_config_path: Option<PathBuf>,
    ) -> Result<Self> {
        let config_path = custom_config_path
            .unwrap_or_else(|| project_path.join(Config::DEFAULT_CONFIG_PATH));

        if !config_path.exists() {
            return Err(anyhow!(
                "Config file not found: {:?}. Please initialize the project first with the `init` command.",
                config_path
            ));
        }

        let config =
            ConfigLoader::from_file(&config_path).with_context(|| "Failed to read config file")?;

        Ok(Self {
            project_path,
            config_path,
            config,
        })
    }

    /// データベース方言を取得
    pub fn dialect(&self) -> Dialect {
        self.config.dialect
    }

    /// メタデータファイルの絶対パス
    pub fn metadata_path(&self) -> PathBuf {
        self.project_path.join(&self.config.metadata_file)
    }

    /// メタデータストアを開く
    pub fn open_store(&self) -> Result<Arc<MetadataStore>> {
        let path = self.metadata_path();
        let store = MetadataStore::open(&path)
            .with_context(|| format!("Failed to open metadata file: {:?}", path))?;
        Ok(Arc::new(store))
    }

    /// 接続設定を解決
    ///
    /// DSNが指定されていればそれを優先し、なければ環境設定に環境変数の上書きを適用します。
    pub fn database_config(&self, env: &str, dsn: Option<&str>) -> Result<DatabaseConfig> {
        if let Some(dsn) = dsn {
            if self.config.dialect != Dialect::MySQL {
                return Err(anyhow!(
                    "--dsn is only supported for the mysql dialect (configured: {})",
                    self.config.dialect
                ));
            }
            return DatabaseConfig::from_dsn(dsn).with_context(|| "Invalid --dsn value");
        }

        let config = self
            .config
            .get_database_config(env)
            .with_context(|| format!("Config for environment '{}' not found", env))?;
        Ok(DatabaseConfigResolver::apply_env_overrides(&config))
    }

    /// データベースへ接続
    pub async fn connect(&self, env: &str, dsn: Option<&str>) -> Result<SqlxConnection> {
        let db_config = self.database_config(env, dsn)?;
        DatabaseConnectionService::new()
            .connect(self.config.dialect, &db_config)
            .await
            .with_context(|| "Failed to connect to database")
    }

    /// 設定された方言のテーブルファサード
    pub fn facade(&self) -> TableFacade {
        TableFacade::for_dialect(self.config.dialect)
    }

    /// ストアを開いて照合サービスを組み立てる
    pub fn reconciler(&self) -> Result<SchemaReconciler> {
        Ok(SchemaReconciler::new(self.facade(), self.open_store()?))
    }
}
