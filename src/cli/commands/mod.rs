// コマンドハンドラー層
// 各CLIコマンドの実装

pub mod forget;
pub mod init;
pub mod show;
pub mod status;
pub mod sync;

use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use serde::Serialize;

/// コマンド出力の共通インターフェース
///
/// JSON出力はSerializeで、テキスト出力は `to_text` で生成する。
pub trait CommandOutput: Serialize {
    fn to_text(&self) -> String;
}

/// 出力フォーマットに従ってコマンド出力を文字列化
pub fn render_output<T: CommandOutput>(output: &T, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(output.to_text()),
        OutputFormat::Json => {
            serde_json::to_string_pretty(output).with_context(|| "Failed to serialize output")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        name: String,
        #[serde(skip)]
        text_message: String,
    }

    impl CommandOutput for Sample {
        fn to_text(&self) -> String {
            self.text_message.clone()
        }
    }

    #[test]
    fn test_render_output() {
        let sample = Sample {
            name: "users".to_string(),
            text_message: "hello".to_string(),
        };

        assert_eq!(render_output(&sample, &OutputFormat::Text).unwrap(), "hello");

        let json = render_output(&sample, &OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["name"], "users");
        assert!(value.get("text_message").is_none());
    }
}
