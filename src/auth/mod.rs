// ==========================================
// 选修课注册系统 - 认证层
// ==========================================
// 职责: 口令摘要、登录、身份上下文、管理员初始化
// ==========================================

pub mod auth_service;
pub mod error;
pub mod hasher;
pub mod seed;

pub use auth_service::{AuthContext, AuthService};
pub use error::{AuthError, AuthResult};
pub use hasher::{BcryptHasher, CredentialHasher, DEFAULT_BCRYPT_COST};
pub use seed::{admin_roll_no, seed_branch_admins};
