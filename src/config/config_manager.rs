// ==========================================
// 选修课注册系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::auth::hasher::{DEFAULT_BCRYPT_COST, MAX_BCRYPT_COST, MIN_BCRYPT_COST};
use crate::config::registration_config_trait::RegistrationConfigReader;
use crate::db::open_sqlite_connection;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 名册导入
    pub const IMPORT_MAX_ROWS: &str = "import.max_rows";

    // 学期区间
    pub const SEMESTER_MIN: &str = "semester.min";
    pub const SEMESTER_MAX: &str = "semester.max";

    // 账号
    pub const SEED_ADMIN_PASSWORD: &str = "seed.admin_password";
    pub const BCRYPT_COST: &str = "auth.bcrypt_cost";

    // 选课窗口
    pub const REGISTRATION_OPEN: &str = "registration.open";
}

pub const DEFAULT_SEMESTER_MIN: i32 = 1;
pub const DEFAULT_SEMESTER_MAX: i32 = 8;
pub const DEFAULT_SEED_ADMIN_PASSWORD: &str = "admin123";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&guard)?;
        }
        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 获取所有 global 配置的快照
    pub fn get_config_snapshot(&self) -> RepositoryResult<HashMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows.into_iter().collect())
    }

    /// 口令摘要 cost；超出 bcrypt 区间时告警并回退默认值
    pub fn get_bcrypt_cost(&self) -> RepositoryResult<u32> {
        let cost = self.get_parsed_or_default(config_keys::BCRYPT_COST, DEFAULT_BCRYPT_COST)?;
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
            tracing::warn!(cost, "bcrypt cost 超出区间，使用默认值");
            return Ok(DEFAULT_BCRYPT_COST);
        }
        Ok(cost)
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 解析数值配置，格式错误时回退默认值并告警
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> RepositoryResult<T>
    where
        T: std::str::FromStr + std::fmt::Display + Copy,
    {
        let raw = match self.get_global_config_value(key)? {
            Some(v) => v,
            None => return Ok(default),
        };
        match raw.trim().parse::<T>() {
            Ok(v) => Ok(v),
            Err(_) => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %raw,
                    default = %default,
                    "配置值格式错误，使用默认值"
                );
                Ok(default)
            }
        }
    }
}

// ==========================================
// RegistrationConfigReader Trait 实现
// ==========================================
#[async_trait]
impl RegistrationConfigReader for ConfigManager {
    async fn get_import_max_rows(&self) -> RepositoryResult<Option<usize>> {
        let limit = self.get_parsed_or_default(config_keys::IMPORT_MAX_ROWS, 0usize)?;
        Ok((limit > 0).then_some(limit))
    }

    async fn get_semester_range(&self) -> RepositoryResult<(i32, i32)> {
        let min = self.get_parsed_or_default(config_keys::SEMESTER_MIN, DEFAULT_SEMESTER_MIN)?;
        let max = self.get_parsed_or_default(config_keys::SEMESTER_MAX, DEFAULT_SEMESTER_MAX)?;
        if min > max {
            tracing::warn!(min, max, "学期区间配置倒置，使用默认区间");
            return Ok((DEFAULT_SEMESTER_MIN, DEFAULT_SEMESTER_MAX));
        }
        Ok((min, max))
    }

    async fn get_seed_admin_password(&self) -> RepositoryResult<String> {
        self.get_config_or_default(
            config_keys::SEED_ADMIN_PASSWORD,
            DEFAULT_SEED_ADMIN_PASSWORD,
        )
    }

    async fn is_registration_open(&self) -> RepositoryResult<bool> {
        let value = self.get_config_or_default(config_keys::REGISTRATION_OPEN, "true")?;
        match value.trim().to_lowercase().as_str() {
            "false" | "0" | "no" | "closed" => Ok(false),
            _ => Ok(true),
        }
    }
}
