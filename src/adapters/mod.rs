// Adapters
// データベース接続と方言固有のSQLへのアクセスを抽象化

pub mod connection;
pub mod connection_string;
pub mod database;
pub mod dialect;
pub mod table_facade;
