// ==========================================
// 选修课注册系统 - 名册导入模块
// ==========================================
// 流程: 解析（首个工作表）→ 逐行校验 → 按学号 upsert → 汇总
// ==========================================

pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod roster_importer_trait;
pub mod roster_reconciler;

pub use error::{ImportError, ImportResult};
pub use field_mapper::{RosterFieldMapper, RowRejection};
pub use file_parser::{CsvParser, ExcelParser, ParsedSheet, UniversalFileParser};
pub use roster_importer_trait::{FileParser, RosterReconciler};
pub use roster_reconciler::RosterReconcilerImpl;
