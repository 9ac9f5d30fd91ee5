// Core Domain
// テーブルメタデータのモデル、設定、エラー型などの純粋なロジック

pub mod config;
pub mod error;
pub mod identifier;
pub mod naming;
pub mod schema;
