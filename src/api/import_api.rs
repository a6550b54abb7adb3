// ==========================================
// 名册导入API
// ==========================================
// 职责: 管理员上传名册 → 解析首个工作表 → 逐行 upsert
// 整单失败: 空负载、无法解析、超过配置的行数上限（默认不限）
// 逐行失败: 记入 results.errors，调用本身仍然成功
// 表头缺列不拒绝整单：每一行都会以缺少必填字段记入 errors
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::auth::AuthContext;
use crate::config::RegistrationConfigReader;
use crate::domain::roster::{columns, ImportOutcome};
use crate::importer::error::ImportError;
use crate::importer::{ExcelParser, FileParser, ParsedSheet, RosterReconciler, UniversalFileParser};
use crate::perf::PerfGuard;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub const UPLOAD_COMPLETED_MSG: &str = "Student upload completed";

/// 名册上传响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadStudentsResponse {
    pub msg: String,
    pub results: ImportOutcome,
}

/// 名册导入API
pub struct ImportApi {
    reconciler: Arc<dyn RosterReconciler>,
    config: Arc<dyn RegistrationConfigReader>,
}

impl ImportApi {
    pub fn new(
        reconciler: Arc<dyn RosterReconciler>,
        config: Arc<dyn RegistrationConfigReader>,
    ) -> Self {
        Self { reconciler, config }
    }

    /// 上传名册（Excel 字节流）
    ///
    /// # 参数
    /// - ctx: 调用方（必须为管理员；名册写入其所属院系）
    /// - bytes: 上传文件内容
    #[instrument(skip(self, ctx, bytes), fields(admin = %ctx.roll_no, branch = %ctx.branch, size = bytes.len()))]
    pub async fn upload_students(
        &self,
        ctx: &AuthContext,
        bytes: &[u8],
    ) -> ApiResult<UploadStudentsResponse> {
        ctx.require_admin()?;
        let _perf = PerfGuard::new("upload_students");

        let sheet = ExcelParser.parse_bytes(bytes)?;
        self.reconcile_sheet(ctx, sheet).await
    }

    /// 上传名册（本地文件，.xlsx/.xls/.csv）
    #[instrument(skip(self, ctx, path), fields(admin = %ctx.roll_no, branch = %ctx.branch))]
    pub async fn upload_students_from_path(
        &self,
        ctx: &AuthContext,
        path: &Path,
    ) -> ApiResult<UploadStudentsResponse> {
        ctx.require_admin()?;
        let _perf = PerfGuard::new("upload_students_from_path");

        let sheet = UniversalFileParser.parse(path)?;
        self.reconcile_sheet(ctx, sheet).await
    }

    async fn reconcile_sheet(
        &self,
        ctx: &AuthContext,
        sheet: ParsedSheet,
    ) -> ApiResult<UploadStudentsResponse> {
        let missing = sheet.missing_columns(&columns::REQUIRED);
        if !missing.is_empty() {
            warn!(missing = ?missing, "表头缺少必填列，所有行将记为缺少字段");
        }

        if let Some(limit) = self.config.get_import_max_rows().await? {
            if sheet.rows.len() > limit {
                return Err(ApiError::from(ImportError::TooManyRows {
                    actual: sheet.rows.len(),
                    limit,
                }));
            }
        }

        info!(rows = sheet.rows.len(), "名册解析完成，开始逐行导入");
        let results = self.reconciler.reconcile(sheet.rows, ctx.branch).await;

        Ok(UploadStudentsResponse {
            msg: UPLOAD_COMPLETED_MSG.to_string(),
            results,
        })
    }
}
