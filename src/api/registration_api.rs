// ==========================================
// 选课API
// ==========================================
// 红线: 每名学生只能选一门课
// 红线: 只能选本院系、本学期开设的课程
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::auth::AuthContext;
use crate::config::RegistrationConfigReader;
use crate::domain::elective::{RegistrationDetail, RegistrationFilter};
use crate::repository::{
    ElectiveRepository, RegistrationRepository, RepositoryError, StudentRepository,
};
use std::sync::Arc;
use tracing::{info, warn};

pub struct RegistrationApi {
    students: Arc<StudentRepository>,
    electives: Arc<ElectiveRepository>,
    registrations: Arc<RegistrationRepository>,
    config: Arc<dyn RegistrationConfigReader>,
}

impl RegistrationApi {
    pub fn new(
        students: Arc<StudentRepository>,
        electives: Arc<ElectiveRepository>,
        registrations: Arc<RegistrationRepository>,
        config: Arc<dyn RegistrationConfigReader>,
    ) -> Self {
        Self {
            students,
            electives,
            registrations,
            config,
        }
    }

    /// 学生选课
    pub async fn register(
        &self,
        ctx: &AuthContext,
        elective_id: i64,
    ) -> ApiResult<RegistrationDetail> {
        if ctx.is_admin() {
            return Err(ApiError::Forbidden(
                "administrators cannot register for electives".to_string(),
            ));
        }
        if !self.config.is_registration_open().await? {
            return Err(ApiError::BusinessRuleViolation(
                "registration window is closed".to_string(),
            ));
        }

        // 以库中最新记录为准（名册可能在登录后被重新导入）
        let student = self
            .students
            .find_by_id(ctx.student_id)?
            .ok_or_else(|| ApiError::NotFound(format!("student {}", ctx.roll_no)))?;
        let elective = self
            .electives
            .find_by_id(elective_id)?
            .ok_or_else(|| ApiError::NotFound(format!("elective {}", elective_id)))?;

        if elective.branch != student.branch || elective.semester != student.semester {
            return Err(ApiError::BusinessRuleViolation(format!(
                "elective {} is offered to {} semester {}, not to {} semester {}",
                elective.code, elective.branch, elective.semester, student.branch, student.semester
            )));
        }

        if let Some(existing) = self.registrations.find_by_student(student.id)? {
            return Err(ApiError::AlreadyRegistered(format!(
                "{} is already registered for {}",
                student.roll_no, existing.elective_code
            )));
        }

        match self.registrations.insert(student.id, elective.id) {
            Ok(_) => {}
            Err(RepositoryError::UniqueConstraintViolation(_)) => {
                warn!(roll_no = %student.roll_no, "并发选课被唯一约束拦截");
                return Err(ApiError::AlreadyRegistered(format!(
                    "{} is already registered",
                    student.roll_no
                )));
            }
            Err(e) => return Err(e.into()),
        }

        info!(roll_no = %student.roll_no, code = %elective.code, "选课成功");
        self.registrations
            .find_by_student(student.id)?
            .ok_or_else(|| ApiError::InternalError("registration vanished after insert".to_string()))
    }

    /// 当前学生的选课记录
    pub fn my_registration(&self, ctx: &AuthContext) -> ApiResult<Option<RegistrationDetail>> {
        Ok(self.registrations.find_by_student(ctx.student_id)?)
    }

    /// 本院系全部选课记录（管理员）
    pub fn list_all(&self, ctx: &AuthContext) -> ApiResult<Vec<RegistrationDetail>> {
        ctx.require_admin()?;
        Ok(self
            .registrations
            .list_by_branch(ctx.branch, &RegistrationFilter::default())?)
    }
}
