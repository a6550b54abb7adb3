// ==========================================
// 选修课注册系统 - 选修课数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑，只做数据 CRUD
// 课程代码全局唯一，由 UNIQUE 约束兜底
// ==========================================

use crate::domain::elective::{Elective, ElectiveUpdate, NewElective};
use crate::domain::types::Branch;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_mapping::{get_branch, get_timestamp, now_rfc3339};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const ELECTIVE_COLUMNS: &str =
    "id, name, code, description, semester, branch, created_at, updated_at";

fn map_elective(row: &Row<'_>) -> rusqlite::Result<Elective> {
    Ok(Elective {
        id: row.get(0)?,
        name: row.get(1)?,
        code: row.get(2)?,
        description: row.get(3)?,
        semester: row.get(4)?,
        branch: get_branch(row, 5)?,
        created_at: get_timestamp(row, 6)?,
        updated_at: get_timestamp(row, 7)?,
    })
}

pub struct ElectiveRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ElectiveRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新建选修课，返回完整记录
    pub fn insert(&self, branch: Branch, elective: &NewElective) -> RepositoryResult<Elective> {
        let conn = self.get_conn()?;
        let now = now_rfc3339();
        conn.execute(
            r#"
            INSERT INTO electives (name, code, description, semester, branch, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
            params![
                elective.name,
                elective.code,
                elective.description,
                elective.semester,
                branch.as_str(),
                now,
            ],
        )?;
        let id = conn.last_insert_rowid();

        let sql = format!("SELECT {} FROM electives WHERE id = ?1", ELECTIVE_COLUMNS);
        let created = conn.query_row(&sql, params![id], map_elective)?;
        Ok(created)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Elective>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM electives WHERE id = ?1", ELECTIVE_COLUMNS);
        let elective = conn.query_row(&sql, params![id], map_elective).optional()?;
        Ok(elective)
    }

    pub fn find_by_code(&self, code: &str) -> RepositoryResult<Option<Elective>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM electives WHERE code = ?1", ELECTIVE_COLUMNS);
        let elective = conn.query_row(&sql, params![code], map_elective).optional()?;
        Ok(elective)
    }

    /// 院系下全部选修课（按学期、代码排序）
    pub fn list_by_branch(&self, branch: Branch) -> RepositoryResult<Vec<Elective>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM electives WHERE branch = ?1 ORDER BY semester ASC, code ASC",
            ELECTIVE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let electives = stmt
            .query_map(params![branch.as_str()], map_elective)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(electives)
    }

    /// 院系某学期的选修课
    pub fn list_by_branch_and_semester(
        &self,
        branch: Branch,
        semester: i32,
    ) -> RepositoryResult<Vec<Elective>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM electives WHERE branch = ?1 AND semester = ?2 ORDER BY code ASC",
            ELECTIVE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let electives = stmt
            .query_map(params![branch.as_str(), semester], map_elective)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(electives)
    }

    /// 部分更新，返回更新后的记录
    pub fn update(&self, id: i64, update: &ElectiveUpdate) -> RepositoryResult<Elective> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let sql = format!("SELECT {} FROM electives WHERE id = ?1", ELECTIVE_COLUMNS);
        let current = tx
            .query_row(&sql, params![id], map_elective)
            .optional()?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Elective".to_string(),
                id: id.to_string(),
            })?;

        let name = update.name.clone().unwrap_or(current.name);
        let code = update.code.clone().unwrap_or(current.code);
        let description = update.description.clone().or(current.description);
        let semester = update.semester.unwrap_or(current.semester);

        tx.execute(
            r#"
            UPDATE electives
            SET name = ?1, code = ?2, description = ?3, semester = ?4, updated_at = ?5
            WHERE id = ?6
            "#,
            params![name, code, description, semester, now_rfc3339(), id],
        )?;

        let updated = tx.query_row(&sql, params![id], map_elective)?;
        tx.commit()?;
        Ok(updated)
    }

    /// 删除选修课，返回是否存在并被删除
    pub fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM electives WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }
}
