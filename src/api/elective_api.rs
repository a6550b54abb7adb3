// ==========================================
// 选修课目录API
// ==========================================
// 职责: 管理员维护本院系选修课；学生按院系 + 学期浏览
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::auth::AuthContext;
use crate::domain::elective::{Elective, ElectiveUpdate, NewElective};
use crate::repository::{ElectiveRepository, RegistrationRepository};
use std::sync::Arc;
use tracing::info;

pub struct ElectiveApi {
    electives: Arc<ElectiveRepository>,
    registrations: Arc<RegistrationRepository>,
}

impl ElectiveApi {
    pub fn new(
        electives: Arc<ElectiveRepository>,
        registrations: Arc<RegistrationRepository>,
    ) -> Self {
        Self {
            electives,
            registrations,
        }
    }

    /// 新建选修课（院系取管理员所属院系）
    pub fn add_elective(&self, ctx: &AuthContext, request: NewElective) -> ApiResult<Elective> {
        ctx.require_admin()?;

        let request = NewElective {
            name: request.name.trim().to_string(),
            code: request.code.trim().to_string(),
            description: normalize_description(request.description),
            semester: request.semester,
        };
        validate_text("name", &request.name)?;
        validate_text("code", &request.code)?;
        validate_semester(request.semester)?;

        if self.electives.find_by_code(&request.code)?.is_some() {
            return Err(ApiError::BusinessRuleViolation(format!(
                "elective code {} already exists",
                request.code
            )));
        }

        let created = self.electives.insert(ctx.branch, &request)?;
        info!(code = %created.code, branch = %created.branch, semester = created.semester, "选修课已创建");
        Ok(created)
    }

    /// 浏览选修课
    ///
    /// - 学生: 只看到本院系、本学期的课程（忽略 semester 参数）
    /// - 管理员: 本院系课程，可选按学期过滤
    pub fn list_electives(
        &self,
        ctx: &AuthContext,
        semester: Option<i32>,
    ) -> ApiResult<Vec<Elective>> {
        if !ctx.is_admin() {
            return Ok(self
                .electives
                .list_by_branch_and_semester(ctx.branch, ctx.semester)?);
        }
        match semester {
            Some(sem) => Ok(self.electives.list_by_branch_and_semester(ctx.branch, sem)?),
            None => Ok(self.electives.list_by_branch(ctx.branch)?),
        }
    }

    pub fn update_elective(
        &self,
        ctx: &AuthContext,
        id: i64,
        update: ElectiveUpdate,
    ) -> ApiResult<Elective> {
        ctx.require_admin()?;
        if update.is_empty() {
            return Err(ApiError::InvalidInput("nothing to update".to_string()));
        }
        self.load_owned(ctx, id)?;

        let update = ElectiveUpdate {
            name: update.name.map(|s| s.trim().to_string()),
            code: update.code.map(|s| s.trim().to_string()),
            description: normalize_description(update.description),
            semester: update.semester,
        };
        if let Some(name) = &update.name {
            validate_text("name", name)?;
        }
        if let Some(code) = &update.code {
            validate_text("code", code)?;
            if let Some(other) = self.electives.find_by_code(code)? {
                if other.id != id {
                    return Err(ApiError::BusinessRuleViolation(format!(
                        "elective code {} already exists",
                        code
                    )));
                }
            }
        }
        if let Some(semester) = update.semester {
            validate_semester(semester)?;
        }

        Ok(self.electives.update(id, &update)?)
    }

    /// 删除选修课（已有学生选课时拒绝）
    pub fn delete_elective(&self, ctx: &AuthContext, id: i64) -> ApiResult<()> {
        ctx.require_admin()?;
        let elective = self.load_owned(ctx, id)?;

        let enrolled = self.registrations.count_by_elective(id)?;
        if enrolled > 0 {
            return Err(ApiError::BusinessRuleViolation(format!(
                "elective {} has {} registration(s) and cannot be deleted",
                elective.code, enrolled
            )));
        }

        self.electives.delete(id)?;
        info!(code = %elective.code, "选修课已删除");
        Ok(())
    }

    /// 读取属于管理员院系的选修课；其他院系的课程视同不存在
    fn load_owned(&self, ctx: &AuthContext, id: i64) -> ApiResult<Elective> {
        match self.electives.find_by_id(id)? {
            Some(elective) if elective.branch == ctx.branch => Ok(elective),
            _ => Err(ApiError::NotFound(format!("elective {}", id))),
        }
    }
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

fn validate_text(field: &str, value: &str) -> ApiResult<()> {
    if value.is_empty() {
        return Err(ApiError::InvalidInput(format!("{} must not be blank", field)));
    }
    Ok(())
}

fn validate_semester(semester: i32) -> ApiResult<()> {
    if semester <= 0 {
        return Err(ApiError::InvalidInput(format!(
            "semester must be positive, got {}",
            semester
        )));
    }
    Ok(())
}
