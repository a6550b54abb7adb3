// ==========================================
// 选修课注册系统 - 口令摘要
// ==========================================
// 算法: bcrypt（存储格式 $2b$<cost>$<salt+digest>）
// 红线: 明文口令不落库、不入日志
// ==========================================

use crate::auth::error::{AuthError, AuthResult};

/// bcrypt 允许的 cost 区间
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// 口令摘要接口（导入器与认证服务共用）
pub trait CredentialHasher: Send + Sync {
    /// 生成可存储的摘要串
    fn hash(&self, secret: &str) -> AuthResult<String>;

    /// 校验明文与已存摘要是否匹配；格式无法识别时返回 false
    fn verify(&self, secret: &str, stored: &str) -> bool;
}

#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    /// cost 超出 bcrypt 区间时收敛到边界
    pub fn new(cost: u32) -> Self {
        Self {
            cost: cost.clamp(MIN_BCRYPT_COST, MAX_BCRYPT_COST),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(DEFAULT_BCRYPT_COST)
    }
}

impl CredentialHasher for BcryptHasher {
    fn hash(&self, secret: &str) -> AuthResult<String> {
        bcrypt::hash(secret, self.cost).map_err(|e| AuthError::Hashing(e.to_string()))
    }

    fn verify(&self, secret: &str, stored: &str) -> bool {
        match bcrypt::verify(secret, stored) {
            Ok(matched) => matched,
            Err(e) => {
                tracing::debug!(error = %e, "口令摘要格式无法识别");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> BcryptHasher {
        BcryptHasher::new(MIN_BCRYPT_COST)
    }

    #[test]
    fn test_hash_then_verify() {
        let hasher = fast_hasher();
        let stored = hasher.hash("s3cret").unwrap();

        assert!(stored.starts_with("$2"));
        assert!(!stored.contains("s3cret"));
        assert!(hasher.verify("s3cret", &stored));
        assert!(!hasher.verify("S3cret", &stored));
    }

    #[test]
    fn test_same_secret_gets_distinct_salts() {
        let hasher = fast_hasher();
        assert_ne!(hasher.hash("123").unwrap(), hasher.hash("123").unwrap());
    }

    #[test]
    fn test_cost_is_clamped_and_encoded() {
        assert_eq!(BcryptHasher::new(1).cost(), MIN_BCRYPT_COST);
        assert_eq!(BcryptHasher::new(99).cost(), MAX_BCRYPT_COST);
        assert_eq!(BcryptHasher::default().cost(), 10);

        let stored = fast_hasher().hash("x").unwrap();
        assert!(stored.contains("$04$"));
    }

    #[test]
    fn test_malformed_stored_value_never_verifies() {
        let hasher = fast_hasher();
        assert!(!hasher.verify("x", ""));
        assert!(!hasher.verify("x", "plain-text"));
        assert!(!hasher.verify("x", "sha256$salt$abcd"));
    }
}
