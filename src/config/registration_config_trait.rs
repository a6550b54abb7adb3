// ==========================================
// 选修课注册系统 - 注册/导入配置读取 Trait
// ==========================================
// 职责: 定义业务层所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// RegistrationConfigReader Trait
// ==========================================
// 用途: 导入、选课、管理员初始化所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait RegistrationConfigReader: Send + Sync {
    // ===== 名册导入 =====

    /// 单次导入允许的最大数据行数
    ///
    /// # 默认值
    /// - None（不限制；配置为 0 同样视为不限制）
    async fn get_import_max_rows(&self) -> RepositoryResult<Option<usize>>;

    /// 学期合法区间（闭区间）
    ///
    /// # 默认值
    /// - (1, 8)
    async fn get_semester_range(&self) -> RepositoryResult<(i32, i32)>;

    // ===== 账号 =====

    /// 初始化管理员账号使用的默认密码
    ///
    /// # 默认值
    /// - admin123
    async fn get_seed_admin_password(&self) -> RepositoryResult<String>;

    // ===== 选课窗口 =====

    /// 选课窗口是否开放
    ///
    /// # 默认值
    /// - true
    async fn is_registration_open(&self) -> RepositoryResult<bool>;
}
