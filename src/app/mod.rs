// ==========================================
// 选修课注册系统 - 应用层
// ==========================================
// 职责: 装配共享连接与各层实例，供 CLI 与测试使用
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
