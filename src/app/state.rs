// ==========================================
// 选修课注册系统 - 应用状态
// ==========================================
// 职责: 打开共享连接、建表、装配仓储/服务/API 实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{AdminApi, ApiResult, ElectiveApi, ImportApi, RegistrationApi, ReportApi};
use crate::auth::{seed_branch_admins, AuthService, BcryptHasher, CredentialHasher};
use crate::config::ConfigManager;
use crate::importer::RosterReconcilerImpl;
use crate::repository::{ElectiveRepository, RegistrationRepository, StudentRepository};

pub const DB_PATH_ENV: &str = "ELECTIVE_REG_DB_PATH";
const DB_FILE_NAME: &str = "elective_registration.db";

/// 应用状态
///
/// 所有仓储共享同一个受互斥锁保护的连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    pub config: Arc<ConfigManager>,
    pub students: Arc<StudentRepository>,
    pub hasher: Arc<dyn CredentialHasher>,

    /// 登录/注册
    pub auth: Arc<AuthService>,

    /// 名册导入API
    pub import_api: Arc<ImportApi>,

    /// 选修课目录API
    pub elective_api: Arc<ElectiveApi>,

    /// 选课API
    pub registration_api: Arc<RegistrationApi>,

    /// 管理员查询API
    pub admin_api: Arc<AdminApi>,

    /// 报表API
    pub report_api: Arc<ReportApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!(db_path = %db_path, "初始化AppState");

        let mut conn = crate::db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("failed to open database: {}", e))?;
        crate::db::init_schema(&conn)
            .map_err(|e| format!("failed to initialise schema: {}", e))?;
        crate::perf::install_sqlite_tracing(&mut conn);
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // Repository / 配置
        // ==========================================
        let students = Arc::new(StudentRepository::from_connection(conn.clone()));
        let electives = Arc::new(ElectiveRepository::from_connection(conn.clone()));
        let registrations = Arc::new(RegistrationRepository::from_connection(conn.clone()));
        let config = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("failed to create ConfigManager: {}", e))?,
        );

        let bcrypt_cost = config
            .get_bcrypt_cost()
            .map_err(|e| format!("failed to read bcrypt cost: {}", e))?;
        let hasher: Arc<dyn CredentialHasher> = Arc::new(BcryptHasher::new(bcrypt_cost));

        // ==========================================
        // 服务 / API
        // ==========================================
        let auth = Arc::new(AuthService::new(students.clone(), hasher.clone()));

        let reconciler = Arc::new(RosterReconcilerImpl::new(
            students.clone(),
            config.clone(),
            hasher.clone(),
        ));
        let import_api = Arc::new(ImportApi::new(reconciler, config.clone()));

        let elective_api = Arc::new(ElectiveApi::new(electives.clone(), registrations.clone()));
        let registration_api = Arc::new(RegistrationApi::new(
            students.clone(),
            electives.clone(),
            registrations.clone(),
            config.clone(),
        ));
        let admin_api = Arc::new(AdminApi::new(
            students.clone(),
            electives.clone(),
            registrations.clone(),
        ));
        let report_api = Arc::new(ReportApi::new(electives, registrations));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            config,
            students,
            hasher,
            auth,
            import_api,
            elective_api,
            registration_api,
            admin_api,
            report_api,
        })
    }

    /// 为缺少管理员的院系创建管理员账号（幂等）
    pub async fn seed_admins(&self) -> ApiResult<usize> {
        let created =
            seed_branch_admins(&self.students, self.hasher.as_ref(), self.config.as_ref()).await?;
        Ok(created)
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 `ELECTIVE_REG_DB_PATH` → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("elective-registration");
        if std::fs::create_dir_all(&dir).is_ok() {
            return dir.join(DB_FILE_NAME).to_string_lossy().to_string();
        }
    }

    format!("./{}", DB_FILE_NAME)
}
