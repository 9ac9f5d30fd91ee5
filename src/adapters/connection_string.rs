// 接続文字列ビルダー
//
// DatabaseConfig と Dialect から接続文字列を生成する。

use crate::core::config::{DatabaseConfig, Dialect};
use urlencoding::encode;

/// 接続文字列を生成
///
/// ユーザー名とパスワードはパーセントエンコードされます。
/// SQLiteではファイルが存在しない場合に作成されるよう `mode=rwc` を付与します。
pub fn build_connection_string(dialect: Dialect, config: &DatabaseConfig) -> String {
    match dialect {
        Dialect::MySQL => format!("{}/{}", mysql_server_url(config), config.database),
        Dialect::SQLite => format!("sqlite://{}?mode=rwc", config.database),
    }
}

/// データベースを指定しないMySQLサーバーへの接続文字列を生成
///
/// データベースの存在確認・作成に使用します。
pub fn build_server_connection_string(config: &DatabaseConfig) -> String {
    format!("{}/", mysql_server_url(config))
}

fn mysql_server_url(config: &DatabaseConfig) -> String {
    let user = config.user.as_deref().unwrap_or("root");
    let encoded_user = encode(user);
    let auth = match config.password.as_deref() {
        Some(password) if !password.is_empty() => {
            format!("{}:{}", encoded_user, encode(password))
        }
        _ => encoded_user.to_string(),
    };
    format!(
        "mysql://{}@{}:{}",
        auth,
        config.host,
        config.effective_port(Dialect::MySQL)
    )
}
