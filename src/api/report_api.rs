// ==========================================
// 选课报表API
// ==========================================
// 职责: 按选修课汇总本院系选课名单，导出 CSV
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::auth::AuthContext;
use crate::domain::elective::{Elective, RegistrationDetail, RegistrationFilter};
use crate::repository::{ElectiveRepository, RegistrationRepository};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

pub const CSV_HEADER: [&str; 6] = [
    "Elective Code",
    "Elective Name",
    "Roll No",
    "Name",
    "Section",
    "Semester",
];

/// 报表中的一名学生
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrolledStudent {
    pub roll_no: String,
    pub name: String,
    pub section: String,
    pub semester: i32,
}

/// 单门选修课的选课名单
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectiveEnrollment {
    pub elective: Elective,
    pub students: Vec<EnrolledStudent>,
}

impl ElectiveEnrollment {
    pub fn count(&self) -> usize {
        self.students.len()
    }
}

pub struct ReportApi {
    electives: Arc<ElectiveRepository>,
    registrations: Arc<RegistrationRepository>,
}

impl ReportApi {
    pub fn new(
        electives: Arc<ElectiveRepository>,
        registrations: Arc<RegistrationRepository>,
    ) -> Self {
        Self {
            electives,
            registrations,
        }
    }

    /// 本院系每门选修课的选课名单（无人选的课程也列出）
    pub fn enrollment_report(&self, ctx: &AuthContext) -> ApiResult<Vec<ElectiveEnrollment>> {
        ctx.require_admin()?;

        let electives = self.electives.list_by_branch(ctx.branch)?;
        let details = self
            .registrations
            .list_by_branch(ctx.branch, &RegistrationFilter::default())?;

        let mut by_elective: HashMap<i64, Vec<EnrolledStudent>> = HashMap::new();
        for d in details {
            by_elective
                .entry(d.elective_id)
                .or_default()
                .push(EnrolledStudent {
                    roll_no: d.roll_no,
                    name: d.student_name,
                    section: d.section,
                    semester: d.semester,
                });
        }

        Ok(electives
            .into_iter()
            .map(|elective| ElectiveEnrollment {
                students: by_elective.remove(&elective.id).unwrap_or_default(),
                elective,
            })
            .collect())
    }

    /// 导出 CSV；指定 elective_id 时只导出该课程
    pub fn export_csv(&self, ctx: &AuthContext, elective_id: Option<i64>) -> ApiResult<String> {
        ctx.require_admin()?;

        if let Some(id) = elective_id {
            match self.electives.find_by_id(id)? {
                Some(e) if e.branch == ctx.branch => {}
                _ => return Err(ApiError::NotFound(format!("elective {}", id))),
            }
        }

        let filter = RegistrationFilter {
            elective_id,
            ..Default::default()
        };
        let details = self.registrations.list_by_branch(ctx.branch, &filter)?;
        write_csv(&details)
    }
}

fn write_csv(details: &[RegistrationDetail]) -> ApiResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let csv_err = |e: csv::Error| ApiError::InternalError(format!("failed to write CSV: {}", e));

    writer.write_record(CSV_HEADER).map_err(csv_err)?;
    for d in details {
        let semester = d.semester.to_string();
        writer
            .write_record([
                d.elective_code.as_str(),
                d.elective_name.as_str(),
                d.roll_no.as_str(),
                d.student_name.as_str(),
                d.section.as_str(),
                semester.as_str(),
            ])
            .map_err(csv_err)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ApiError::InternalError(format!("failed to flush CSV: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| ApiError::InternalError(e.to_string()))
}
