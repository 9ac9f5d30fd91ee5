// 設定ファイル管理
//
// プロジェクトの設定ファイル（YAML形式）の構造、方言の選択、
// 環境別のデータベース接続設定を定義します。

use crate::core::error::ConfigError;
use crate::core::naming::{CONFIG_FILE, METADATA_FILE};
use anyhow::{anyhow, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::LazyLock;

/// データベース方言
///
/// 設定ファイルからの読み込みも `FromStr` を経由するため、CLI引数と同じ表記を受け付けます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Dialect {
    #[serde(rename = "mysql")]
    MySQL,
    #[serde(rename = "sqlite")]
    SQLite,
}

impl Dialect {
    /// 方言の既定ポート（SQLiteは0）
    pub fn default_port(&self) -> u16 {
        match self {
            Dialect::MySQL => 3306,
            Dialect::SQLite => 0,
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::MySQL => write!(f, "mysql"),
            Dialect::SQLite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for Dialect {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(Dialect::MySQL),
            "sqlite" | "sqlite3" => Ok(Dialect::SQLite),
            _ => Err(ConfigError::UnsupportedDialect {
                name: value.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Dialect {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// プロジェクト設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 設定ファイルのバージョン
    pub version: String,

    /// データベース方言
    pub dialect: Dialect,

    /// メタデータファイル（プロジェクトディレクトリからの相対パス）
    #[serde(default = "default_metadata_file")]
    pub metadata_file: PathBuf,

    /// 環境別のデータベース設定
    pub environments: HashMap<String, DatabaseConfig>,
}

fn default_metadata_file() -> PathBuf {
    PathBuf::from(METADATA_FILE)
}

impl Config {
    /// デフォルトの設定ファイルパス
    pub const DEFAULT_CONFIG_PATH: &'static str = CONFIG_FILE;

    /// 指定された環境のデータベース設定を取得
    pub fn get_database_config(&self, environment: &str) -> Result<DatabaseConfig, ConfigError> {
        self.environments
            .get(environment)
            .cloned()
            .ok_or_else(|| {
                let mut available: Vec<String> = self.environments.keys().cloned().collect();
                available.sort();
                ConfigError::MissingEnvironment {
                    name: environment.to_string(),
                    available,
                }
            })
    }

    /// 設定の妥当性を検証
    pub fn validate(&self) -> Result<()> {
        if self.version.is_empty() {
            return Err(anyhow!("Config file version is not specified"));
        }

        if self.environments.is_empty() {
            return Err(anyhow!(
                "At least one environment configuration is required"
            ));
        }

        for (env_name, db_config) in &self.environments {
            db_config
                .validate()
                .with_context(|| format!("Invalid config for environment '{}'", env_name))?;
        }

        Ok(())
    }
}

impl FromStr for Config {
    type Err = anyhow::Error;

    fn from_str(yaml: &str) -> Result<Self, Self::Err> {
        serde_saphyr::from_str(yaml).with_context(|| "Failed to parse config file")
    }
}

/// データベース接続設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// ホスト名（SQLiteの場合は不要）
    #[serde(default = "default_host")]
    pub host: String,

    /// ポート番号（未指定時は方言の既定値）
    #[serde(default)]
    pub port: Option<u16>,

    /// データベース名（SQLiteではファイルパス）
    pub database: String,

    /// ユーザー名
    #[serde(default)]
    pub user: Option<String>,

    /// パスワード
    #[serde(default)]
    pub password: Option<String>,

    /// 接続タイムアウト（秒）
    #[serde(default)]
    pub timeout: Option<u64>,

    /// データベースが存在しない場合に作成する（MySQLのみ）
    #[serde(default)]
    pub create_database: bool,
}

fn default_host() -> String {
    "localhost".to_string()
}

// user:password@tcp(1.2.3.4:3306)/dbname
static DSN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<user>[A-Za-z0-9]+):(?P<password>[^@]+)@tcp\((?P<host>(?:\d+\.){3}\d+):(?P<port>\d+)\)/(?P<database>[A-Za-z0-9_]+)$",
    )
    .expect("dsn pattern is valid")
});

impl DatabaseConfig {
    /// Validate database configuration
    pub fn validate(&self) -> Result<()> {
        if self.database.is_empty() {
            return Err(anyhow!("Database name is not specified"));
        }

        Ok(())
    }

    /// 方言を考慮した実効ポート
    pub fn effective_port(&self, dialect: Dialect) -> u16 {
        self.port.unwrap_or_else(|| dialect.default_port())
    }

    /// `user:password@tcp(host:port)/database` 形式の接続記述を解析
    pub fn from_dsn(dsn: &str) -> Result<Self, ConfigError> {
        let captures = DSN_PATTERN
            .captures(dsn.trim())
            .ok_or_else(|| ConfigError::InvalidConnection {
                value: dsn.to_string(),
                reason: "expected user:password@tcp(host:port)/database".to_string(),
            })?;

        let port = captures["port"]
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidConnection {
                value: dsn.to_string(),
                reason: format!("invalid port: {}", e),
            })?;

        Ok(Self {
            host: captures["host"].to_string(),
            port: Some(port),
            database: captures["database"].to_string(),
            user: Some(captures["user"].to_string()),
            password: Some(captures["password"].to_string()),
            timeout: None,
            create_database: false,
        })
    }
}
