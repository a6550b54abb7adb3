// ==========================================
// 选修课注册系统 - 选修课与选课记录实体
// ==========================================
// 选修课按 (院系, 学期) 划分，课程代码全局唯一
// 每名学生至多一条选课记录
// ==========================================

use crate::domain::types::Branch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Elective - 选修课
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Elective {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub semester: i32,
    pub branch: Branch,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 新建选修课请求（院系取自管理员上下文）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewElective {
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub semester: i32,
}

/// 选修课部分更新（None 表示保持不变）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElectiveUpdate {
    pub name: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    pub semester: Option<i32>,
}

impl ElectiveUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.code.is_none()
            && self.description.is_none()
            && self.semester.is_none()
    }
}

// ==========================================
// RegistrationDetail - 选课记录（联表展开）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationDetail {
    pub registration_id: i64,
    pub student_id: i64,
    pub roll_no: String,
    pub student_name: String,
    pub section: String,
    pub semester: i32,
    pub branch: Branch,
    pub elective_id: i64,
    pub elective_code: String,
    pub elective_name: String,
    pub registered_at: DateTime<Utc>,
}

/// 选课记录过滤条件
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationFilter {
    pub semester: Option<i32>,
    pub section: Option<String>,
    pub elective_id: Option<i64>,
}
