// ==========================================
// 选修课注册系统 - 学生/账号实体
// ==========================================
// 红线: 学号 (roll_no) 唯一且不可变
// 红线: 密码仅以单向摘要形式存储，永不对外暴露
// ==========================================

use crate::domain::types::{Branch, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// StudentRecord - 持久化的账号记录
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecord {
    pub id: i64,
    pub roll_no: String,
    pub name: String,
    pub section: String,
    pub semester: i32,
    pub branch: Branch,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudentRecord {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// ==========================================
// NewStudentRecord - 待插入记录（密码已摘要）
// ==========================================
#[derive(Debug, Clone)]
pub struct NewStudentRecord {
    pub roll_no: String,
    pub name: String,
    pub section: String,
    pub semester: i32,
    pub branch: Branch,
    pub password_hash: String,
    pub role: Role,
}

// ==========================================
// StudentUpsert - 名册导入的单行写入请求
// ==========================================
// 按学号匹配：存在则覆盖可变字段，不存在则以 student 角色新建
#[derive(Debug, Clone)]
pub struct StudentUpsert {
    pub roll_no: String,
    pub name: String,
    pub section: String,
    pub semester: i32,
    pub branch: Branch,
    pub password_hash: String,
}

/// Upsert 实际执行的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertAction {
    Created,
    Updated,
}

// ==========================================
// NewStudent - 自助注册请求（明文密码）
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStudent {
    pub roll_no: String,
    pub name: String,
    pub section: String,
    pub semester: i32,
    pub branch: Branch,
    pub password: String,
}

// ==========================================
// StudentView - 对外展示（不含密码摘要）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentView {
    pub id: i64,
    pub roll_no: String,
    pub name: String,
    pub section: String,
    pub semester: i32,
    pub branch: Branch,
    pub role: Role,
}

impl From<&StudentRecord> for StudentView {
    fn from(record: &StudentRecord) -> Self {
        Self {
            id: record.id,
            roll_no: record.roll_no.clone(),
            name: record.name.clone(),
            section: record.section.clone(),
            semester: record.semester,
            branch: record.branch,
            role: record.role,
        }
    }
}

impl From<StudentRecord> for StudentView {
    fn from(record: StudentRecord) -> Self {
        Self::from(&record)
    }
}
