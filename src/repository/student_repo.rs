// ==========================================
// 选修课注册系统 - 学生/账号数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑，只做数据 CRUD
// 约束: 所有查询使用参数化
// ==========================================

use crate::domain::student::{NewStudentRecord, StudentRecord, StudentUpsert, UpsertAction};
use crate::domain::types::{Branch, Role};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::roster_repo::RosterRepository;
use crate::repository::row_mapping::{get_branch, get_role, get_timestamp, now_rfc3339};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const STUDENT_COLUMNS: &str =
    "id, roll_no, name, section, semester, branch, password_hash, role, created_at, updated_at";

fn map_student(row: &Row<'_>) -> rusqlite::Result<StudentRecord> {
    Ok(StudentRecord {
        id: row.get(0)?,
        roll_no: row.get(1)?,
        name: row.get(2)?,
        section: row.get(3)?,
        semester: row.get(4)?,
        branch: get_branch(row, 5)?,
        password_hash: row.get(6)?,
        role: get_role(row, 7)?,
        created_at: get_timestamp(row, 8)?,
        updated_at: get_timestamp(row, 9)?,
    })
}

// ==========================================
// StudentRepository - students 表仓储
// ==========================================
pub struct StudentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StudentRepository {
    /// 创建新的 StudentRepository 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按学号查询
    pub fn find_by_roll_no(&self, roll_no: &str) -> RepositoryResult<Option<StudentRecord>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM students WHERE roll_no = ?1", STUDENT_COLUMNS);
        let record = conn
            .query_row(&sql, params![roll_no], map_student)
            .optional()?;
        Ok(record)
    }

    /// 按主键查询
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<StudentRecord>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM students WHERE id = ?1", STUDENT_COLUMNS);
        let record = conn.query_row(&sql, params![id], map_student).optional()?;
        Ok(record)
    }

    /// 插入新账号，返回主键
    ///
    /// 学号重复时返回 UniqueConstraintViolation
    pub fn insert(&self, record: &NewStudentRecord) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let now = now_rfc3339();
        conn.execute(
            r#"
            INSERT INTO students (
                roll_no, name, section, semester, branch,
                password_hash, role, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            "#,
            params![
                record.roll_no,
                record.name,
                record.section,
                record.semester,
                record.branch.as_str(),
                record.password_hash,
                record.role.as_str(),
                now,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 按学号 upsert（查找与写入在同一事务内完成）
    pub fn upsert_by_roll_no(&self, entry: &StudentUpsert) -> RepositoryResult<UpsertAction> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let existing: Option<(i64, String)> = tx
            .query_row(
                "SELECT id, role FROM students WHERE roll_no = ?1",
                params![entry.roll_no],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let now = now_rfc3339();
        let action = match existing {
            Some((_, role)) if role == Role::Admin.as_str() => {
                return Err(RepositoryError::BusinessRuleViolation(format!(
                    "roll number {} belongs to an administrator account",
                    entry.roll_no
                )));
            }
            Some((id, _)) => {
                tx.execute(
                    r#"
                    UPDATE students
                    SET name = ?1, section = ?2, semester = ?3, branch = ?4,
                        password_hash = ?5, updated_at = ?6
                    WHERE id = ?7
                    "#,
                    params![
                        entry.name,
                        entry.section,
                        entry.semester,
                        entry.branch.as_str(),
                        entry.password_hash,
                        now,
                        id,
                    ],
                )?;
                UpsertAction::Updated
            }
            None => {
                tx.execute(
                    r#"
                    INSERT INTO students (
                        roll_no, name, section, semester, branch,
                        password_hash, role, created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
                    "#,
                    params![
                        entry.roll_no,
                        entry.name,
                        entry.section,
                        entry.semester,
                        entry.branch.as_str(),
                        entry.password_hash,
                        Role::Student.as_str(),
                        now,
                    ],
                )?;
                UpsertAction::Created
            }
        };

        tx.commit()?;
        Ok(action)
    }

    /// 查询院系下全部学生（按学号排序）
    pub fn list_students_by_branch(&self, branch: Branch) -> RepositoryResult<Vec<StudentRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM students WHERE branch = ?1 AND role = 'student' ORDER BY roll_no ASC",
            STUDENT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let students = stmt
            .query_map(params![branch.as_str()], map_student)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(students)
    }

    /// 院系下学生出现过的学期（升序去重）
    pub fn distinct_semesters(&self, branch: Branch) -> RepositoryResult<Vec<i32>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT DISTINCT semester FROM students
            WHERE branch = ?1 AND role = 'student'
            ORDER BY semester ASC
            "#,
        )?;
        let semesters = stmt
            .query_map(params![branch.as_str()], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i32>>>()?;
        Ok(semesters)
    }

    /// 院系某学期下出现过的班级（升序去重）
    pub fn distinct_sections(&self, branch: Branch, semester: i32) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT DISTINCT section FROM students
            WHERE branch = ?1 AND role = 'student' AND semester = ?2
            ORDER BY section ASC
            "#,
        )?;
        let sections = stmt
            .query_map(params![branch.as_str(), semester], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(sections)
    }

    /// 查询院系管理员
    pub fn find_admin_by_branch(&self, branch: Branch) -> RepositoryResult<Option<StudentRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM students WHERE branch = ?1 AND role = 'admin' ORDER BY id LIMIT 1",
            STUDENT_COLUMNS
        );
        let record = conn
            .query_row(&sql, params![branch.as_str()], map_student)
            .optional()?;
        Ok(record)
    }
}

#[async_trait]
impl RosterRepository for StudentRepository {
    async fn upsert_roster_entry(&self, entry: &StudentUpsert) -> RepositoryResult<UpsertAction> {
        self.upsert_by_roll_no(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> StudentRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        StudentRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn upsert(roll_no: &str, name: &str, semester: i32) -> StudentUpsert {
        StudentUpsert {
            roll_no: roll_no.to_string(),
            name: name.to_string(),
            section: "A".to_string(),
            semester,
            branch: Branch::Cse,
            password_hash: "h".to_string(),
        }
    }

    #[test]
    fn test_upsert_creates_then_updates() {
        let repo = setup();

        let first = repo.upsert_by_roll_no(&upsert("R1", "Alice", 3)).unwrap();
        assert_eq!(first, UpsertAction::Created);

        let second = repo.upsert_by_roll_no(&upsert("R1", "Alicia", 5)).unwrap();
        assert_eq!(second, UpsertAction::Updated);

        let record = repo.find_by_roll_no("R1").unwrap().unwrap();
        assert_eq!(record.name, "Alicia");
        assert_eq!(record.semester, 5);
        assert_eq!(record.role, Role::Student);
    }

    #[test]
    fn test_upsert_refuses_admin_roll_no() {
        let repo = setup();
        repo.insert(&NewStudentRecord {
            roll_no: "admincse001".to_string(),
            name: "CSE Admin".to_string(),
            section: "Admin".to_string(),
            semester: 0,
            branch: Branch::Cse,
            password_hash: "h".to_string(),
            role: Role::Admin,
        })
        .unwrap();

        let result = repo.upsert_by_roll_no(&upsert("admincse001", "Mallory", 3));
        assert!(matches!(result, Err(RepositoryError::BusinessRuleViolation(_))));

        let admin = repo.find_by_roll_no("admincse001").unwrap().unwrap();
        assert_eq!(admin.name, "CSE Admin");
    }

    #[test]
    fn test_distinct_semesters_and_sections() {
        let repo = setup();
        repo.upsert_by_roll_no(&upsert("R1", "A", 5)).unwrap();
        repo.upsert_by_roll_no(&upsert("R2", "B", 3)).unwrap();
        let mut c = upsert("R3", "C", 3);
        c.section = "B".to_string();
        repo.upsert_by_roll_no(&c).unwrap();

        assert_eq!(repo.distinct_semesters(Branch::Cse).unwrap(), vec![3, 5]);
        assert_eq!(
            repo.distinct_sections(Branch::Cse, 3).unwrap(),
            vec!["A".to_string(), "B".to_string()]
        );
        assert!(repo.distinct_semesters(Branch::It).unwrap().is_empty());
    }

    #[test]
    fn test_insert_duplicate_roll_no_rejected() {
        let repo = setup();
        let record = NewStudentRecord {
            roll_no: "R1".to_string(),
            name: "A".to_string(),
            section: "A".to_string(),
            semester: 3,
            branch: Branch::It,
            password_hash: "h".to_string(),
            role: Role::Student,
        };
        repo.insert(&record).unwrap();
        let err = repo.insert(&record).unwrap_err();
        assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));
    }
}
