// ==========================================
// 管理员查询API
// ==========================================
// 所有查询限定在管理员所属院系；口令摘要不对外暴露
// ==========================================

use crate::api::error::ApiResult;
use crate::auth::AuthContext;
use crate::domain::elective::{Elective, RegistrationDetail, RegistrationFilter};
use crate::domain::student::StudentView;
use crate::repository::{ElectiveRepository, RegistrationRepository, StudentRepository};
use std::sync::Arc;

pub struct AdminApi {
    students: Arc<StudentRepository>,
    electives: Arc<ElectiveRepository>,
    registrations: Arc<RegistrationRepository>,
}

impl AdminApi {
    pub fn new(
        students: Arc<StudentRepository>,
        electives: Arc<ElectiveRepository>,
        registrations: Arc<RegistrationRepository>,
    ) -> Self {
        Self {
            students,
            electives,
            registrations,
        }
    }

    /// 本院系学生（按学号排序）
    pub fn list_students(&self, ctx: &AuthContext) -> ApiResult<Vec<StudentView>> {
        ctx.require_admin()?;
        let students = self.students.list_students_by_branch(ctx.branch)?;
        Ok(students.into_iter().map(StudentView::from).collect())
    }

    pub fn semesters(&self, ctx: &AuthContext) -> ApiResult<Vec<i32>> {
        ctx.require_admin()?;
        Ok(self.students.distinct_semesters(ctx.branch)?)
    }

    pub fn sections(&self, ctx: &AuthContext, semester: i32) -> ApiResult<Vec<String>> {
        ctx.require_admin()?;
        Ok(self.students.distinct_sections(ctx.branch, semester)?)
    }

    pub fn electives_by_semester(
        &self,
        ctx: &AuthContext,
        semester: i32,
    ) -> ApiResult<Vec<Elective>> {
        ctx.require_admin()?;
        Ok(self
            .electives
            .list_by_branch_and_semester(ctx.branch, semester)?)
    }

    pub fn filtered_registrations(
        &self,
        ctx: &AuthContext,
        filter: &RegistrationFilter,
    ) -> ApiResult<Vec<RegistrationDetail>> {
        ctx.require_admin()?;
        Ok(self.registrations.list_by_branch(ctx.branch, filter)?)
    }
}
