// ==========================================
// 选修课注册系统 - 名册导入 Repository Trait
// ==========================================
// 职责: 定义名册导入所需的数据访问接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::student::{StudentUpsert, UpsertAction};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// RosterRepository Trait
// ==========================================
// 用途: 名册导入器的按学号 upsert
// 实现者: StudentRepository（使用 rusqlite）
#[async_trait]
pub trait RosterRepository: Send + Sync {
    /// 按学号 upsert 一名学生（查找与写入原子完成）
    ///
    /// # 参数
    /// - entry: 已校验、密码已摘要的单行数据
    ///
    /// # 返回
    /// - Ok(UpsertAction::Created): 学号不存在，以 student 角色新建
    /// - Ok(UpsertAction::Updated): 学号已存在，覆盖姓名/班级/学期/院系/密码
    /// - Err: 数据库错误，或学号属于管理员账号
    async fn upsert_roster_entry(&self, entry: &StudentUpsert) -> RepositoryResult<UpsertAction>;
}
