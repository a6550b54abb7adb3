// ==========================================
// 选修课注册系统 - 名册导入数据结构
// ==========================================
// ImportRow: 表格单行原始数据（不落库，仅存活于一次导入调用）
// RosterEntry: 校验通过后的强类型行
// ImportOutcome: 单次导入的结果汇总
// ==========================================

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 名册表头列名（与模板一致）
pub mod columns {
    pub const NAME: &str = "Name";
    pub const ROLL_NO: &str = "RollNo";
    pub const SECTION: &str = "Section";
    pub const PASSWORD: &str = "Password";
    pub const SEMESTER: &str = "Semester";

    pub const REQUIRED: [&str; 5] = [NAME, ROLL_NO, SECTION, PASSWORD, SEMESTER];
}

// ==========================================
// ImportRow - 原始行
// ==========================================
// cells 保留单元格原始类型（数字单元格仍为 Number），
// 空单元格不出现在 cells 中
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    /// 表格中的行号（表头为第 1 行）
    pub row_number: usize,
    pub cells: Map<String, Value>,
}

impl ImportRow {
    pub fn new(row_number: usize, cells: Map<String, Value>) -> Self {
        Self { row_number, cells }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.get(column)
    }

    /// 行内容的 JSON 形式，用于错误诊断（密码列以 *** 代替）
    pub fn diagnostic_json(&self) -> String {
        let mut masked = self.cells.clone();
        if let Some(v) = masked.get_mut(columns::PASSWORD) {
            *v = Value::String("***".to_string());
        }
        Value::Object(masked).to_string()
    }
}

// ==========================================
// RosterEntry - 校验后的强类型行
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub row_number: usize,
    pub roll_no: String,
    pub name: String,
    pub section: String,
    pub password: String,
    pub semester: i32,
}

// ==========================================
// ImportOutcome - 导入结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub created: usize,
    pub updated: usize,
    pub errors: Vec<String>,
}

impl ImportOutcome {
    /// 成功写入的行数
    pub fn written(&self) -> usize {
        self.created + self.updated
    }
}
