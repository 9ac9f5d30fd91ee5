// Services Layer
// メタデータの永続化、スキーマ照合、設定の読み込みを行うサービス層

pub mod config_loader;
pub mod database_config_resolver;
pub mod metadata_store;
pub mod schema_reconciler;
