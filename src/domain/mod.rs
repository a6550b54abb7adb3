// ==========================================
// 选修课注册系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与封闭词表
// 红线: 不含数据访问逻辑
// ==========================================

pub mod elective;
pub mod roster;
pub mod student;
pub mod types;

// 重导出核心类型
pub use elective::{
    Elective, ElectiveUpdate, NewElective, RegistrationDetail, RegistrationFilter,
};
pub use roster::{ImportOutcome, ImportRow, RosterEntry};
pub use student::{
    NewStudent, NewStudentRecord, StudentRecord, StudentUpsert, StudentView, UpsertAction,
};
pub use types::{Branch, Role, UnknownVariant};
