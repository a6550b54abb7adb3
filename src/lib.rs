// ==========================================
// 选修课注册系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 角色: 学生选课 / 管理员维护课程、导入名册、导出报表
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 名册表格
pub mod importer;

// 认证层 - 口令摘要与身份上下文
pub mod auth;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// SQL 计数与慢查询日志
pub mod perf;

// API 层 - 业务接口
pub mod api;

// 应用层 - 装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::types::{Branch, Role};
pub use domain::{Elective, ImportOutcome, ImportRow, StudentRecord, StudentView};

pub use api::{AdminApi, ApiError, ElectiveApi, ImportApi, RegistrationApi, ReportApi};
pub use app::AppState;
pub use auth::{AuthContext, AuthService};
pub use importer::{RosterReconciler, RosterReconcilerImpl};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Elective Registration";
