// 命名ポリシー
//
// アプリケーション名と関連パスの単一ソースを提供します。

/// 現行アプリケーション名
pub const APP_NAME: &str = "tablekeeper";

/// 既定の設定ファイル名
pub const CONFIG_FILE: &str = ".tablekeeper.yaml";

/// 既定のメタデータファイル名（プロジェクトディレクトリからの相対パス）
pub const METADATA_FILE: &str = "activetables.json";

/// 既定の環境名
pub const DEFAULT_ENVIRONMENT: &str = "development";
