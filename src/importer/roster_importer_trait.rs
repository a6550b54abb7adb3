// ==========================================
// 选修课注册系统 - 名册导入 Trait 定义
// ==========================================
// 职责: 定义导入流程各阶段的接口（不含实现）
// 阶段 0: 文件解析（FileParser）
// 阶段 1: 逐行校验 + upsert（RosterReconciler）
// ==========================================

use crate::domain::roster::{ImportOutcome, ImportRow};
use crate::domain::types::Branch;
use crate::importer::error::ImportResult;
use crate::importer::file_parser::ParsedSheet;
use async_trait::async_trait;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 把上传的原始字节解析为首个工作表
// 实现者: ExcelParser, CsvParser
pub trait FileParser: Send + Sync {
    /// 解析字节流
    ///
    /// # 返回
    /// - Ok(ParsedSheet): 表头 + 非空数据行
    /// - Err: 空负载、无法识别的格式、无工作表
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<ParsedSheet>;
}

// ==========================================
// RosterReconciler Trait
// ==========================================
// 用途: 逐行校验并按学号 upsert
// 实现者: RosterReconcilerImpl
#[async_trait]
pub trait RosterReconciler: Send + Sync {
    /// 对一批原始行执行 upsert
    ///
    /// # 参数
    /// - rows: 原始行（按表格顺序）
    /// - branch: 调用方所属院系（来自认证上下文，不从表格读取）
    ///
    /// # 返回
    /// 逐行结果汇总；单行失败只记入 errors，不会中断整批
    async fn reconcile(&self, rows: Vec<ImportRow>, branch: Branch) -> ImportOutcome;
}
