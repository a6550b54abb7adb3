// ==========================================
// 选修课注册系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod elective_repo;
pub mod error;
pub mod registration_repo;
pub mod roster_repo;
mod row_mapping;
pub mod student_repo;

// 重导出核心仓储
pub use elective_repo::ElectiveRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use registration_repo::RegistrationRepository;
pub use roster_repo::RosterRepository;
pub use student_repo::StudentRepository;
