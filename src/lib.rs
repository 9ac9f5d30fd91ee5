// Tablekeeperライブラリのエントリーポイント
//
// モジュール構造:
// - cli: CLIレイヤー（ユーザー入力の受付とコマンドルーティング）
// - core: コアドメイン（スキーマモデル、設定、エラー、識別子検証）
// - adapters: データベース接続と方言固有のSQLを抽象化
// - services: メタデータストアとスキーマ照合エンジン

pub mod adapters;
pub mod cli;
pub mod core;
pub mod services;
