// ==========================================
// 选修课注册系统 - 名册导入器实现
// ==========================================
// 职责: 逐行校验 → 口令摘要 → 按学号 upsert → 汇总结果
// 约束: 严格按表格顺序逐行处理，每行写入完成后再处理下一行
// 约束: 单行失败只记入 errors，已写入的行不回滚
// ==========================================

use crate::auth::hasher::CredentialHasher;
use crate::config::config_manager::{DEFAULT_SEMESTER_MAX, DEFAULT_SEMESTER_MIN};
use crate::config::RegistrationConfigReader;
use crate::domain::roster::{ImportOutcome, ImportRow};
use crate::domain::student::{StudentUpsert, UpsertAction};
use crate::domain::types::Branch;
use crate::importer::field_mapper::{RosterFieldMapper, RowRejection};
use crate::importer::roster_importer_trait::RosterReconciler;
use crate::repository::roster_repo::RosterRepository;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

// ==========================================
// RosterReconcilerImpl
// ==========================================
pub struct RosterReconcilerImpl<R, C>
where
    R: RosterRepository,
    C: RegistrationConfigReader,
{
    repo: Arc<R>,
    config: Arc<C>,
    hasher: Arc<dyn CredentialHasher>,
}

impl<R, C> RosterReconcilerImpl<R, C>
where
    R: RosterRepository,
    C: RegistrationConfigReader,
{
    pub fn new(repo: Arc<R>, config: Arc<C>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self {
            repo,
            config,
            hasher,
        }
    }

    async fn field_mapper(&self) -> RosterFieldMapper {
        match self.config.get_semester_range().await {
            Ok((min, max)) => RosterFieldMapper::new(min, max),
            Err(e) => {
                warn!(error = %e, "读取学期区间失败，使用默认区间");
                RosterFieldMapper::new(DEFAULT_SEMESTER_MIN, DEFAULT_SEMESTER_MAX)
            }
        }
    }
}

#[async_trait]
impl<R, C> RosterReconciler for RosterReconcilerImpl<R, C>
where
    R: RosterRepository,
    C: RegistrationConfigReader,
{
    #[instrument(skip(self, rows), fields(rows = rows.len(), branch = %branch))]
    async fn reconcile(&self, rows: Vec<ImportRow>, branch: Branch) -> ImportOutcome {
        let mapper = self.field_mapper().await;
        let mut outcome = ImportOutcome::default();
        let mut seen: HashSet<String> = HashSet::new();

        for row in rows {
            let entry = match mapper.map_row(&row) {
                Ok(entry) => entry,
                Err(RowRejection::MissingFields(missing)) => {
                    debug!(row_number = row.row_number, missing = ?missing, "缺少必填字段");
                    outcome.errors.push(format!(
                        "Row missing required fields: {}",
                        row.diagnostic_json()
                    ));
                    continue;
                }
                Err(rejection) => {
                    debug!(row_number = row.row_number, reason = %rejection, "字段值非法");
                    outcome.errors.push(format!(
                        "Error processing row {}: {}",
                        row.diagnostic_json(),
                        rejection
                    ));
                    continue;
                }
            };

            if !seen.insert(entry.roll_no.clone()) {
                warn!(
                    row_number = entry.row_number,
                    roll_no = %entry.roll_no,
                    "同一批次内学号重复，后出现的行覆盖前者"
                );
            }

            let password_hash = match self.hasher.hash(&entry.password) {
                Ok(hash) => hash,
                Err(e) => {
                    warn!(row_number = row.row_number, roll_no = %entry.roll_no, error = %e, "口令摘要失败");
                    outcome.errors.push(format!(
                        "Error processing row {}: {}",
                        row.diagnostic_json(),
                        e
                    ));
                    continue;
                }
            };

            let upsert = StudentUpsert {
                roll_no: entry.roll_no,
                name: entry.name,
                section: entry.section,
                semester: entry.semester,
                branch,
                password_hash,
            };

            match self.repo.upsert_roster_entry(&upsert).await {
                Ok(UpsertAction::Created) => outcome.created += 1,
                Ok(UpsertAction::Updated) => outcome.updated += 1,
                Err(e) => {
                    warn!(row_number = row.row_number, roll_no = %upsert.roll_no, error = %e, "行写入失败");
                    outcome.errors.push(format!(
                        "Error processing row {}: {}",
                        row.diagnostic_json(),
                        e
                    ));
                }
            }
        }

        info!(
            created = outcome.created,
            updated = outcome.updated,
            errors = outcome.errors.len(),
            "名册导入完成"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hasher::{BcryptHasher, MIN_BCRYPT_COST};
    use crate::repository::error::{RepositoryError, RepositoryResult};
    use serde_json::{json, Map, Value};
    use std::collections::HashMap;
    use std::sync::Mutex;

    // ===== 内存仓储 =====
    #[derive(Default)]
    struct MemoryRosterRepo {
        students: Mutex<HashMap<String, StudentUpsert>>,
        calls: Mutex<Vec<String>>,
        fail_on: Option<String>,
    }

    #[async_trait]
    impl RosterRepository for MemoryRosterRepo {
        async fn upsert_roster_entry(&self, entry: &StudentUpsert) -> RepositoryResult<UpsertAction> {
            self.calls.lock().unwrap().push(entry.roll_no.clone());
            if self.fail_on.as_deref() == Some(entry.roll_no.as_str()) {
                return Err(RepositoryError::DatabaseQueryError("disk I/O error".to_string()));
            }
            let mut students = self.students.lock().unwrap();
            let action = if students.contains_key(&entry.roll_no) {
                UpsertAction::Updated
            } else {
                UpsertAction::Created
            };
            students.insert(entry.roll_no.clone(), entry.clone());
            Ok(action)
        }
    }

    struct FixedConfig;

    #[async_trait]
    impl RegistrationConfigReader for FixedConfig {
        async fn get_import_max_rows(&self) -> RepositoryResult<Option<usize>> {
            Ok(None)
        }
        async fn get_semester_range(&self) -> RepositoryResult<(i32, i32)> {
            Ok((1, 8))
        }
        async fn get_seed_admin_password(&self) -> RepositoryResult<String> {
            Ok("admin123".to_string())
        }
        async fn is_registration_open(&self) -> RepositoryResult<bool> {
            Ok(true)
        }
    }

    fn reconciler(repo: Arc<MemoryRosterRepo>) -> RosterReconcilerImpl<MemoryRosterRepo, FixedConfig> {
        RosterReconcilerImpl::new(repo, Arc::new(FixedConfig), Arc::new(BcryptHasher::new(MIN_BCRYPT_COST)))
    }

    fn rows(values: Vec<Value>) -> Vec<ImportRow> {
        values
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                let cells: Map<String, Value> = v.as_object().cloned().unwrap();
                ImportRow::new(i + 2, cells)
            })
            .collect()
    }

    #[tokio::test]
    async fn test_missing_field_row_is_reported_and_skipped() {
        let repo = Arc::new(MemoryRosterRepo::default());
        let outcome = reconciler(repo.clone())
            .reconcile(
                rows(vec![
                    json!({"Name": "A", "RollNo": "R1", "Section": "A", "Password": 123, "Semester": 3}),
                    json!({"Name": "B", "Section": "B", "Password": 456, "Semester": 3}),
                ]),
                Branch::Cse,
            )
            .await;

        assert_eq!(outcome.created, 1);
        assert_eq!(outcome.updated, 0);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].starts_with("Row missing required fields: "));
        assert!(outcome.errors[0].contains("\"Name\":\"B\""));
        // 口令不出现在诊断信息中
        assert!(!outcome.errors[0].contains("456"));
        assert_eq!(repo.calls.lock().unwrap().as_slice(), ["R1".to_string()]);
    }

    #[tokio::test]
    async fn test_storage_failure_isolated_to_row() {
        let repo = Arc::new(MemoryRosterRepo {
            fail_on: Some("R2".to_string()),
            ..Default::default()
        });
        let outcome = reconciler(repo.clone())
            .reconcile(
                rows(vec![
                    json!({"Name": "A", "RollNo": "R1", "Section": "A", "Password": "x", "Semester": 3}),
                    json!({"Name": "B", "RollNo": "R2", "Section": "A", "Password": "x", "Semester": 3}),
                    json!({"Name": "C", "RollNo": "R3", "Section": "A", "Password": "x", "Semester": 3}),
                ]),
                Branch::It,
            )
            .await;

        assert_eq!(outcome.created, 2);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].starts_with("Error processing row {"));
        assert!(outcome.errors[0].ends_with("database query failed: disk I/O error"));

        // 严格按顺序逐行处理
        assert_eq!(
            repo.calls.lock().unwrap().as_slice(),
            ["R1".to_string(), "R2".to_string(), "R3".to_string()]
        );
    }

    #[tokio::test]
    async fn test_branch_comes_from_caller_and_secret_is_hashed() {
        let repo = Arc::new(MemoryRosterRepo::default());
        reconciler(repo.clone())
            .reconcile(
                rows(vec![json!({
                    "Name": "A", "RollNo": "R1", "Section": "A", "Password": 123.0,
                    "Semester": 3, "Branch": "IT"
                })]),
                Branch::Ece,
            )
            .await;

        let students = repo.students.lock().unwrap();
        let stored = students.get("R1").unwrap();
        assert_eq!(stored.branch, Branch::Ece);
        assert!(BcryptHasher::default().verify("123", &stored.password_hash));
    }

    #[tokio::test]
    async fn test_duplicate_roll_no_within_batch_second_row_updates() {
        let repo = Arc::new(MemoryRosterRepo::default());
        let outcome = reconciler(repo.clone())
            .reconcile(
                rows(vec![
                    json!({"Name": "First", "RollNo": "R1", "Section": "A", "Password": "x", "Semester": 3}),
                    json!({"Name": "Second", "RollNo": "R1", "Section": "B", "Password": "y", "Semester": 4}),
                ]),
                Branch::Cse,
            )
            .await;

        assert_eq!(outcome.created, 1);
        assert_eq!(outcome.updated, 1);
        assert_eq!(repo.students.lock().unwrap().get("R1").unwrap().name, "Second");
    }

    #[tokio::test]
    async fn test_invalid_semester_reported_as_processing_error() {
        let repo = Arc::new(MemoryRosterRepo::default());
        let outcome = reconciler(repo)
            .reconcile(
                rows(vec![
                    json!({"Name": "A", "RollNo": "R1", "Section": "A", "Password": "x", "Semester": "0"}),
                    json!({"Name": "B", "RollNo": "R2", "Section": "A", "Password": "x", "Semester": 0}),
                ]),
                Branch::Cse,
            )
            .await;

        assert_eq!(outcome.written(), 0);
        assert_eq!(outcome.errors.len(), 2);
        assert!(outcome.errors[0].starts_with("Error processing row "));
        assert!(outcome.errors[0].contains("invalid Semester"));
        // 数值 0 视同未填写
        assert!(outcome.errors[1].starts_with("Row missing required fields: "));
    }
}
