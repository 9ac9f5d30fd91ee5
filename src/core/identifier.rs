// 識別子検証
//
// 方言層はテーブル名・カラム名をパラメータ化せずにSQLへ埋め込むため、
// 外部から受け取った識別子はこの許可リストを通過したものに限定する。

use crate::core::error::DatabaseError;
use regex::Regex;
use std::sync::LazyLock;

/// 識別子の最大長（MySQLの上限に合わせる）
pub const MAX_IDENTIFIER_LENGTH: usize = 64;

static IDENTIFIER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("identifier pattern is valid"));

/// 識別子を検証
///
/// 英数字とアンダースコアのみ、1〜64文字を許可します。
///
/// # Examples
/// ```
/// use tablekeeper::core::identifier::validate_identifier;
/// assert!(validate_identifier("user_accounts").is_ok());
/// assert!(validate_identifier("users; DROP TABLE x").is_err());
/// ```
pub fn validate_identifier(name: &str) -> Result<(), DatabaseError> {
    if name.is_empty() {
        return Err(invalid(name, "identifier must not be empty"));
    }
    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(invalid(
            name,
            &format!(
                "identifier must be at most {} characters",
                MAX_IDENTIFIER_LENGTH
            ),
        ));
    }
    if !IDENTIFIER_PATTERN.is_match(name) {
        return Err(invalid(
            name,
            "only letters, digits and underscores are allowed",
        ));
    }
    Ok(())
}

fn invalid(name: &str, reason: &str) -> DatabaseError {
    DatabaseError::InvalidIdentifier {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}
