// データベース接続アダプター
//
// SQLxを使用したデータベース接続の管理を行います。
// MySQL、SQLiteに対応した統一されたインターフェースを提供します。

use crate::adapters::connection::{map_sqlx_error, SqlxConnection};
use crate::adapters::connection_string::{build_connection_string, build_server_connection_string};
use crate::core::config::{DatabaseConfig, Dialect};
use crate::core::error::DatabaseError;
use crate::core::identifier::validate_identifier;
use sqlx::pool::PoolOptions;
use sqlx::{Any, AnyPool};
use std::time::Duration;
use tracing::{debug, info};

/// 既定の接続取得タイムアウト（秒）
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// データベース接続サービス
///
/// データベース接続プールの初期化と管理を行います。
#[derive(Debug, Clone, Default)]
pub struct DatabaseConnectionService {}

impl DatabaseConnectionService {
    /// 新しいDatabaseConnectionServiceを作成
    pub fn new() -> Self {
        Self {}
    }

    /// 設定に従って接続を確立
    ///
    /// MySQLで `create_database` が有効な場合は、先にデータベースの存在を確認し
    /// 存在しなければ作成します。
    pub async fn connect(
        &self,
        dialect: Dialect,
        config: &DatabaseConfig,
    ) -> Result<SqlxConnection, DatabaseError> {
        sqlx::any::install_default_drivers();

        if dialect == Dialect::MySQL && config.create_database {
            self.ensure_mysql_database(config).await?;
        }

        let pool = self.create_pool(dialect, config).await?;
        self.test_connection(&pool).await?;
        info!(dialect = %dialect, database = %config.database, "Connected to database");

        Ok(SqlxConnection::new(pool))
    }

    /// データベース接続プールを作成
    pub async fn create_pool(
        &self,
        dialect: Dialect,
        config: &DatabaseConfig,
    ) -> Result<AnyPool, DatabaseError> {
        let connection_string = build_connection_string(dialect, config);

        self.create_pool_options(config.timeout)
            .connect(&connection_string)
            .await
            .map_err(|e| DatabaseError::Connection {
                message: format!("Failed to create connection pool for {}", dialect),
                cause: e.to_string(),
            })
    }

    /// 接続テストを実行
    pub async fn test_connection(&self, pool: &AnyPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1")
            .execute(pool)
            .await
            .map(|_| ())
            .map_err(|e| DatabaseError::Connection {
                message: "Connection test failed".to_string(),
                cause: e.to_string(),
            })
    }

    /// プールオプションを作成
    ///
    /// 照合パスは単一の接続を順に使うため、プールは1接続に制限します。
    pub fn create_pool_options(&self, timeout_secs: Option<u64>) -> PoolOptions<Any> {
        let timeout = timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        PoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(timeout))
    }

    /// MySQLサーバー上にデータベースが存在することを保証
    async fn ensure_mysql_database(&self, config: &DatabaseConfig) -> Result<(), DatabaseError> {
        validate_identifier(&config.database)?;

        let server_url = build_server_connection_string(config);
        let pool = self
            .create_pool_options(config.timeout)
            .connect(&server_url)
            .await
            .map_err(|e| DatabaseError::Connection {
                message: "Failed to connect to MySQL server".to_string(),
                cause: e.to_string(),
            })?;

        let exists_sql = format!("SHOW DATABASES LIKE '{}'", config.database);
        let existing = sqlx::raw_sql(&exists_sql)
            .fetch_all(&pool)
            .await
            .map_err(|e| map_sqlx_error(e, &exists_sql))?;

        if existing.is_empty() {
            let create_sql = format!("CREATE DATABASE {}", config.database);
            sqlx::raw_sql(&create_sql)
                .execute(&pool)
                .await
                .map_err(|e| map_sqlx_error(e, &create_sql))?;
            info!(database = %config.database, "Created missing database");
        } else {
            debug!(database = %config.database, "Database already exists");
        }

        pool.close().await;
        Ok(())
    }
}
