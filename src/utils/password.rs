//! 管理员密码工具
//!
//! 配置中的密码可以是明文，也可以是 Argon2id 哈希（`$argon2` 开头）。

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use subtle::ConstantTimeEq;

/// 密码哈希错误
#[derive(Debug)]
pub enum PasswordError {
    HashError(String),
    VerifyError(String),
}

impl std::fmt::Display for PasswordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HashError(msg) => write!(f, "Password hash error: {}", msg),
            Self::VerifyError(msg) => write!(f, "Password verify error: {}", msg),
        }
    }
}

impl std::error::Error for PasswordError {}

/// 对密码进行 Argon2id 哈希
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// 检测字符串是否是 Argon2 哈希格式
pub fn is_argon2_hash(s: &str) -> bool {
    s.starts_with("$argon2")
}

/// 校验登录密码
///
/// 配置值是 Argon2 哈希时走哈希校验，否则做常量时间比较。
pub fn verify_admin_password(input: &str, configured: &str) -> Result<bool, PasswordError> {
    if is_argon2_hash(configured) {
        let parsed =
            PasswordHash::new(configured).map_err(|e| PasswordError::VerifyError(e.to_string()))?;
        return Ok(Argon2::default()
            .verify_password(input.as_bytes(), &parsed)
            .is_ok());
    }

    Ok(input.as_bytes().ct_eq(configured.as_bytes()).into())
}
