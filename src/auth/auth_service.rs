// ==========================================
// 选修课注册系统 - 认证服务
// ==========================================
// 职责: 登录校验、学生自助注册、调用方身份上下文
// 红线: 口令摘要永不离开本模块与仓储层
// ==========================================

use crate::auth::error::{AuthError, AuthResult};
use crate::auth::hasher::CredentialHasher;
use crate::domain::student::{NewStudent, NewStudentRecord, StudentRecord, StudentView};
use crate::domain::types::{Branch, Role};
use crate::repository::error::RepositoryError;
use crate::repository::student_repo::StudentRepository;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

// ==========================================
// AuthContext - 已认证调用方
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub student_id: i64,
    pub roll_no: String,
    pub name: String,
    pub role: Role,
    pub branch: Branch,
    pub semester: i32,
    pub section: String,
}

impl AuthContext {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// 要求管理员身份
    pub fn require_admin(&self) -> AuthResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AuthError::Forbidden(format!(
                "{} is not an administrator",
                self.roll_no
            )))
        }
    }
}

impl From<&StudentRecord> for AuthContext {
    fn from(record: &StudentRecord) -> Self {
        Self {
            student_id: record.id,
            roll_no: record.roll_no.clone(),
            name: record.name.clone(),
            role: record.role,
            branch: record.branch,
            semester: record.semester,
            section: record.section.clone(),
        }
    }
}

// ==========================================
// AuthService
// ==========================================
pub struct AuthService {
    students: Arc<StudentRepository>,
    hasher: Arc<dyn CredentialHasher>,
}

impl AuthService {
    pub fn new(students: Arc<StudentRepository>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { students, hasher }
    }

    /// 学号 + 口令登录
    pub fn login(&self, roll_no: &str, password: &str) -> AuthResult<AuthContext> {
        let roll_no = roll_no.trim();
        let record = self
            .students
            .find_by_roll_no(roll_no)?
            .ok_or_else(|| AuthError::UserNotFound(roll_no.to_string()))?;

        if !self.hasher.verify(password, &record.password_hash) {
            warn!(roll_no = %record.roll_no, "登录口令校验失败");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(AuthContext::from(&record))
    }

    /// 学生自助注册（角色固定为 student）
    pub fn register_student(&self, request: NewStudent) -> AuthResult<StudentView> {
        let roll_no = request.roll_no.trim().to_string();
        let name = request.name.trim().to_string();
        let section = request.section.trim().to_string();

        for (field, value) in [("roll_no", &roll_no), ("name", &name), ("section", &section)] {
            if value.is_empty() {
                return Err(AuthError::InvalidInput(format!("{} must not be blank", field)));
            }
        }
        if request.password.is_empty() {
            return Err(AuthError::InvalidInput("password must not be blank".to_string()));
        }
        if request.semester <= 0 {
            return Err(AuthError::InvalidInput(format!(
                "semester must be positive, got {}",
                request.semester
            )));
        }

        if self.students.find_by_roll_no(&roll_no)?.is_some() {
            return Err(AuthError::RollNoTaken(roll_no));
        }

        let record = NewStudentRecord {
            roll_no: roll_no.clone(),
            name,
            section,
            semester: request.semester,
            branch: request.branch,
            password_hash: self.hasher.hash(&request.password)?,
            role: Role::Student,
        };

        let id = match self.students.insert(&record) {
            Ok(id) => id,
            Err(RepositoryError::UniqueConstraintViolation(_)) => {
                return Err(AuthError::RollNoTaken(roll_no));
            }
            Err(e) => return Err(e.into()),
        };

        info!(roll_no = %record.roll_no, branch = %record.branch, "学生自助注册成功");

        let created = self
            .students
            .find_by_id(id)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Student".to_string(),
                id: id.to_string(),
            })?;
        Ok(StudentView::from(created))
    }
}
