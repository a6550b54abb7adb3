// ==========================================
// 选修课注册系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，把下层技术错误转换为调用方可理解的错误
// 约束: 每个错误都带稳定的错误代码（ErrorResponse.code）
// ==========================================

use crate::auth::error::AuthError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 身份与权限
    // ==========================================
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("business rule violated: {0}")]
    BusinessRuleViolation(String),

    #[error("already registered: {0}")]
    AlreadyRegistered(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("database connection failed: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 导入错误（整单失败）
    // ==========================================
    #[error("No file uploaded")]
    NoFileUploaded,

    #[error("import failed: roster has {actual} rows, limit is {limit}")]
    RowLimitExceeded { actual: usize, limit: usize },

    #[error("import failed: {0}")]
    ImportError(String),

    #[error("validation failed: {0}")]
    ValidationError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 稳定错误代码
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::BusinessRuleViolation(_) => "BUSINESS_RULE_VIOLATION",
            ApiError::AlreadyRegistered(_) => "ALREADY_REGISTERED",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::DatabaseConnectionError(_) => "DATABASE_CONNECTION_ERROR",
            ApiError::NoFileUploaded => "NO_FILE_UPLOADED",
            ApiError::RowLimitExceeded { .. } => "INVALID_INPUT",
            ApiError::ImportError(_) => "IMPORT_ERROR",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
            ApiError::Other(_) => "OTHER_ERROR",
        }
    }
}

// ==========================================
// ErrorResponse - 返回给调用方的错误结构
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 错误代码
    pub code: String,

    /// 错误消息
    pub message: String,

    /// 详细信息（可选）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            details: match err {
                ApiError::RowLimitExceeded { actual, limit } => {
                    Some(serde_json::json!({ "actual": actual, "limit": limit }))
                }
                _ => None,
            },
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} (id={})", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("failed to acquire database lock: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("unique constraint violated: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("foreign key constraint violated: {}", msg))
            }
            RepositoryError::BusinessRuleViolation(msg) => ApiError::BusinessRuleViolation(msg),
            RepositoryError::CorruptValue { column, message } => {
                ApiError::DatabaseError(format!("column {}: {}", column, message))
            }
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::EmptyPayload => ApiError::NoFileUploaded,
            ImportError::TooManyRows { actual, limit } => {
                ApiError::RowLimitExceeded { actual, limit }
            }
            ImportError::FileNotFound(path) => ApiError::NotFound(format!("file {}", path)),
            ImportError::UnsupportedFormat(_) => ApiError::InvalidInput(err.to_string()),
            ImportError::ConfigReadError(msg) | ImportError::InternalError(msg) => {
                ApiError::InternalError(msg)
            }
            ImportError::Other(err) => ApiError::Other(err),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

// ==========================================
// 从 AuthError 转换
// ==========================================
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UserNotFound(roll_no) => ApiError::NotFound(format!("user {}", roll_no)),
            AuthError::InvalidCredentials => ApiError::Unauthorized("invalid credentials".to_string()),
            AuthError::Forbidden(msg) => ApiError::Forbidden(msg),
            AuthError::RollNoTaken(roll_no) => ApiError::BusinessRuleViolation(format!(
                "roll number {} is already registered",
                roll_no
            )),
            AuthError::InvalidInput(msg) => ApiError::InvalidInput(msg),
            AuthError::Hashing(msg) => ApiError::InternalError(msg),
            AuthError::Repository(err) => err.into(),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
