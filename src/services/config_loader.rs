// 設定ファイル読み込みサービス
//
// core::config の純粋性を保つため、ファイルI/Oはこのサービスに集約する。

use crate::core::config::Config;
use anyhow::{Context, Result};
use std::path::Path;

/// 設定ファイル読み込みサービス
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// YAMLファイルから設定を読み込み、検証する
    pub fn from_file(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Config = content.parse()?;
        config.validate()?;
        Ok(config)
    }

    /// 設定をYAMLファイルへ書き出す
    pub fn write_file(path: &Path, config: &Config) -> Result<()> {
        let yaml =
            serde_saphyr::to_string(config).with_context(|| "Failed to serialize config file")?;
        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{DatabaseConfig, Dialect};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".tablekeeper.yaml");
        std::fs::write(
            &path,
            r#"
version: "1.0"
dialect: mysql
environments:
  development:
    host: localhost
    port: 3306
    database: app
    user: root
"#,
        )
        .unwrap();

        let config = ConfigLoader::from_file(&path).unwrap();
        assert_eq!(config.dialect, Dialect::MySQL);
        assert_eq!(config.metadata_file, PathBuf::from("activetables.json"));
    }

    #[test]
    fn test_from_file_rejects_invalid_environment() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".tablekeeper.yaml");
        std::fs::write(
            &path,
            r#"
version: "1.0"
dialect: sqlite
environments:
  development:
    database: ""
"#,
        )
        .unwrap();

        let err = ConfigLoader::from_file(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Database name is not specified"));
    }

    #[test]
    fn test_from_file_missing() {
        let temp_dir = TempDir::new().unwrap();
        let err = ConfigLoader::from_file(&temp_dir.path().join("missing.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_write_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".tablekeeper.yaml");

        let mut environments = HashMap::new();
        environments.insert(
            "development".to_string(),
            DatabaseConfig {
                host: "localhost".to_string(),
                port: None,
                database: "app.db".to_string(),
                user: None,
                password: None,
                timeout: Some(30),
                create_database: false,
            },
        );
        let config = Config {
            version: "1.0".to_string(),
            dialect: Dialect::SQLite,
            metadata_file: PathBuf::from("meta/activetables.json"),
            environments,
        };

        ConfigLoader::write_file(&path, &config).unwrap();
        let loaded = ConfigLoader::from_file(&path).unwrap();

        assert_eq!(loaded.dialect, Dialect::SQLite);
        assert_eq!(loaded.metadata_file, PathBuf::from("meta/activetables.json"));
        assert_eq!(
            loaded.get_database_config("development").unwrap(),
            config.get_database_config("development").unwrap()
        );
    }
}
