// ==========================================
// 选修课注册系统 - 行映射辅助函数
// ==========================================
// 职责: TEXT 列 → 枚举/时间类型的统一转换
// 转换失败以 FromSqlConversionFailure 形式上抛
// ==========================================

use crate::domain::types::{Branch, Role};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::Row;

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

pub(crate) fn get_branch(row: &Row<'_>, idx: usize) -> rusqlite::Result<Branch> {
    let raw: String = row.get(idx)?;
    raw.parse::<Branch>().map_err(|e| conversion_error(idx, e))
}

pub(crate) fn get_role(row: &Row<'_>, idx: usize) -> rusqlite::Result<Role> {
    let raw: String = row.get(idx)?;
    raw.parse::<Role>().map_err(|e| conversion_error(idx, e))
}

pub(crate) fn get_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

/// 统一时间戳写入格式
pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}
