// ==========================================
// 选修课注册系统 - 选课记录数据仓储
// ==========================================
// 红线: 每名学生至多一条选课记录（student_id UNIQUE）
// ==========================================

use crate::domain::elective::{RegistrationDetail, RegistrationFilter};
use crate::domain::types::Branch;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_mapping::{get_branch, get_timestamp, now_rfc3339};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const DETAIL_SELECT: &str = r#"
    SELECT r.id, s.id, s.roll_no, s.name, s.section, s.semester, s.branch,
           e.id, e.code, e.name, r.created_at
    FROM registrations r
    JOIN students s ON s.id = r.student_id
    JOIN electives e ON e.id = r.elective_id
"#;

fn map_detail(row: &Row<'_>) -> rusqlite::Result<RegistrationDetail> {
    Ok(RegistrationDetail {
        registration_id: row.get(0)?,
        student_id: row.get(1)?,
        roll_no: row.get(2)?,
        student_name: row.get(3)?,
        section: row.get(4)?,
        semester: row.get(5)?,
        branch: get_branch(row, 6)?,
        elective_id: row.get(7)?,
        elective_code: row.get(8)?,
        elective_name: row.get(9)?,
        registered_at: get_timestamp(row, 10)?,
    })
}

pub struct RegistrationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RegistrationRepository {
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

    /// 写入选课记录
    ///
    /// 学生已有记录时返回 UniqueConstraintViolation
    pub fn insert(&self, student_id: i64, elective_id: i64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO registrations (student_id, elective_id, created_at) VALUES (?1, ?2, ?3)",
            params![student_id, elective_id, now_rfc3339()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 查询学生的选课记录
    pub fn find_by_student(&self, student_id: i64) -> RepositoryResult<Option<RegistrationDetail>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE r.student_id = ?1", DETAIL_SELECT);
        let detail = conn
            .query_row(&sql, params![student_id], map_detail)
            .optional()?;
        Ok(detail)
    }

    /// 某门选修课的选课人数
    pub fn count_by_elective(&self, elective_id: i64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM registrations WHERE elective_id = ?1",
            params![elective_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// 院系内选课记录（可选按学期/班级/课程过滤）
    ///
    /// 排序: 课程代码 → 学号
    pub fn list_by_branch(
        &self,
        branch: Branch,
        filter: &RegistrationFilter,
    ) -> RepositoryResult<Vec<RegistrationDetail>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"{}
            WHERE e.branch = ?1
              AND (?2 IS NULL OR s.semester = ?2)
              AND (?3 IS NULL OR s.section = ?3)
              AND (?4 IS NULL OR e.id = ?4)
            ORDER BY e.code ASC, s.roll_no ASC
            "#,
            DETAIL_SELECT
        );
        let mut stmt = conn.prepare(&sql)?;
        let details = stmt
            .query_map(
                params![
                    branch.as_str(),
                    filter.semester,
                    filter.section,
                    filter.elective_id,
                ],
                map_detail,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(details)
    }
}
