/// CLI エントリーポイントのテスト
///
/// CLIの構造が正しく定義され、サブコマンドとグローバルオプションが
/// 期待通りにパースされること、DB接続を伴わないコマンドが動作することを確認します。
use clap::Parser;

#[cfg(test)]
mod cli_tests {
    use super::*;
    use tablekeeper::cli::commands::forget::{ForgetCommand, ForgetCommandHandler};
    use tablekeeper::cli::commands::init::{InitCommand, InitCommandHandler};
    use tablekeeper::cli::commands::show::{ShowCommand, ShowCommandHandler};
    use tablekeeper::cli::{Cli, Commands, OutputFormat};
    use tablekeeper::core::config::Dialect;
    use tablekeeper::core::schema::{FieldSchema, TableMetadata, TableSchema};
    use tablekeeper::services::metadata_store::MetadataStore;
    use tempfile::TempDir;

    #[test]
    fn test_help_and_version() {
        assert!(Cli::try_parse_from(["tablekeeper", "--help"]).is_err());
        assert!(Cli::try_parse_from(["tablekeeper", "--version"]).is_err());
    }

    #[test]
    fn test_init_requires_dialect() {
        assert!(Cli::try_parse_from(["tablekeeper", "init"]).is_err());

        let cli =
            Cli::try_parse_from(["tablekeeper", "init", "--dialect", "mysql", "--database", "app"])
                .unwrap();
        match cli.command {
            Commands::Init {
                dialect,
                database,
                force,
            } => {
                assert_eq!(dialect, "mysql");
                assert_eq!(database.as_deref(), Some("app"));
                assert!(!force);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_options() {
        let cli = Cli::try_parse_from([
            "tablekeeper",
            "sync",
            "--env",
            "production",
            "--dsn",
            "root:secret@tcp(127.0.0.1:3306)/app",
            "--format",
            "json",
            "--no-color",
            "-v",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::Sync));
        assert_eq!(cli.env, "production");
        assert_eq!(
            cli.dsn.as_deref(),
            Some("root:secret@tcp(127.0.0.1:3306)/app")
        );
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.no_color);
        assert!(cli.verbose);
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["tablekeeper", "status"]).unwrap();
        assert!(matches!(cli.command, Commands::Status));
        assert_eq!(cli.env, "development");
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(cli.dsn.is_none());
    }

    #[test]
    fn test_show_and_forget_take_table() {
        let cli = Cli::try_parse_from(["tablekeeper", "show", "users"]).unwrap();
        assert!(matches!(cli.command, Commands::Show { ref table } if table == "users"));

        let cli = Cli::try_parse_from(["tablekeeper", "forget", "users"]).unwrap();
        assert!(matches!(cli.command, Commands::Forget { ref table } if table == "users"));

        assert!(Cli::try_parse_from(["tablekeeper", "show"]).is_err());
    }

    fn init_project(temp_dir: &TempDir) {
        InitCommandHandler::new()
            .execute(&InitCommand {
                project_path: temp_dir.path().to_path_buf(),
                dialect: Dialect::SQLite,
                force: false,
                database_name: "app.db".to_string(),
            })
            .unwrap();

        let store = MetadataStore::open(temp_dir.path().join("activetables.json")).unwrap();
        let schema = TableSchema::new()
            .with_column("id", FieldSchema::new("INTEGER").not_null().primary_key())
            .with_column("title", FieldSchema::new("TEXT"));
        store
            .upsert("posts", TableMetadata::new("posts", schema))
            .unwrap();
    }

    #[test]
    fn test_show_and_forget_commands() {
        let temp_dir = TempDir::new().unwrap();
        init_project(&temp_dir);

        let shown = ShowCommandHandler::new()
            .execute(&ShowCommand {
                project_path: temp_dir.path().to_path_buf(),
                config_path: None,
                table: "posts".to_string(),
                format: OutputFormat::Json,
            })
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&shown).unwrap();
        assert_eq!(value["table"], "posts");
        assert_eq!(value["columns"][0]["name"], "id");
        assert_eq!(value["columns"][0]["key"], "PRI");
        assert_eq!(value["columns"][1]["name"], "title");

        let forgotten = ForgetCommandHandler::new()
            .execute(&ForgetCommand {
                project_path: temp_dir.path().to_path_buf(),
                config_path: None,
                table: "posts".to_string(),
                format: OutputFormat::Text,
            })
            .unwrap();
        assert_eq!(forgotten, "Forgot table 'posts'.");

        let err = ShowCommandHandler::new()
            .execute(&ShowCommand {
                project_path: temp_dir.path().to_path_buf(),
                config_path: None,
                table: "posts".to_string(),
                format: OutputFormat::Text,
            })
            .unwrap_err();
        assert!(err.to_string().contains("is not recorded"));
    }

    #[test]
    fn test_show_rejects_invalid_table_name() {
        let temp_dir = TempDir::new().unwrap();
        init_project(&temp_dir);

        let err = ShowCommandHandler::new()
            .execute(&ShowCommand {
                project_path: temp_dir.path().to_path_buf(),
                config_path: None,
                table: "posts; DROP TABLE posts".to_string(),
                format: OutputFormat::Text,
            })
            .unwrap_err();
        assert!(err.to_string().contains("Invalid identifier"));
    }
}
