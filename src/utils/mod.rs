pub mod password;

/// 生成 URL 安全的随机 token（base64url，无填充）
pub fn generate_secure_token(bytes: usize) -> String {
    use base64::Engine;
    use rand::RngExt;

    let mut buf = vec![0u8; bytes];
    rand::rng().fill(buf.as_mut_slice());
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_secure_token() {
        let a = generate_secure_token(32);
        let b = generate_secure_token(32);
        assert_eq!(a.len(), 43);
        assert_ne!(a, b);
    }
}
