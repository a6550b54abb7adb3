// ==========================================
// 选修课注册系统 - 名册字段映射器
// ==========================================
// 职责: ImportRow（弱类型）→ RosterEntry（强类型）
// 数字单元格统一转为字符串形式（123.0 → "123"）
// 数值 0 的单元格视同未填写（文本 "0" 仍视为已填写）
// ==========================================

use crate::domain::roster::{columns, ImportRow, RosterEntry};
use serde_json::Value;
use thiserror::Error;

/// 单行被拒绝的原因
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowRejection {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("invalid {field}: {message}")]
    InvalidValue { field: &'static str, message: String },
}

pub struct RosterFieldMapper {
    semester_min: i32,
    semester_max: i32,
}

impl RosterFieldMapper {
    pub fn new(semester_min: i32, semester_max: i32) -> Self {
        Self {
            semester_min,
            semester_max,
        }
    }

    /// 校验并转换单行
    pub fn map_row(&self, row: &ImportRow) -> Result<RosterEntry, RowRejection> {
        let missing: Vec<&'static str> = columns::REQUIRED
            .iter()
            .copied()
            .filter(|col| row.get(col).map_or(true, is_blank))
            .collect();
        if !missing.is_empty() {
            return Err(RowRejection::MissingFields(missing));
        }

        let text = |col: &'static str| row.get(col).and_then(cell_text).unwrap_or_default();

        Ok(RosterEntry {
            row_number: row.row_number,
            roll_no: text(columns::ROLL_NO),
            name: text(columns::NAME),
            section: text(columns::SECTION),
            password: text(columns::PASSWORD),
            semester: self.parse_semester(row.get(columns::SEMESTER))?,
        })
    }

    fn parse_semester(&self, value: Option<&Value>) -> Result<i32, RowRejection> {
        let invalid = |message: String| RowRejection::InvalidValue {
            field: columns::SEMESTER,
            message,
        };

        let raw = value.and_then(cell_text).unwrap_or_default();
        let semester = match value {
            Some(Value::Number(n)) => integral(n.as_f64())
                .ok_or_else(|| invalid(format!("expected an integer, got {}", n)))?,
            _ => raw
                .parse::<i64>()
                .ok()
                .or_else(|| integral(raw.parse::<f64>().ok()))
                .ok_or_else(|| invalid(format!("expected an integer, got {:?}", raw)))?,
        };

        if semester < i64::from(self.semester_min) || semester > i64::from(self.semester_max) {
            return Err(invalid(format!(
                "{} is outside {}..={}",
                semester, self.semester_min, self.semester_max
            )));
        }
        // 区间已收窄到 i32 范围内
        Ok(semester as i32)
    }
}

/// 整数值的浮点数 → i64
fn integral(value: Option<f64>) -> Option<i64> {
    match value {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => Some(f as i64),
        _ => None,
    }
}

/// 必填列判空：空白文本与数值 0 均视为未填写
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.as_f64() == Some(0.0),
        other => cell_text(other).is_none(),
    }
}

/// 单元格的字符串形式；空白视为缺失
fn cell_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => match n.as_i64() {
            Some(i) => i.to_string(),
            None => match integral(n.as_f64()) {
                Some(i) => i.to_string(),
                None => n.to_string(),
            },
        },
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn row(value: Value) -> ImportRow {
        let cells: Map<String, Value> = value.as_object().cloned().unwrap();
        ImportRow::new(2, cells)
    }

    fn mapper() -> RosterFieldMapper {
        RosterFieldMapper::new(1, 8)
    }

    #[test]
    fn test_numeric_cells_are_coerced() {
        let entry = mapper()
            .map_row(&row(json!({
                "Name": " Alice ",
                "RollNo": 21001.0,
                "Section": "A",
                "Password": 123.0,
                "Semester": 3.0
            })))
            .unwrap();

        assert_eq!(entry.name, "Alice");
        assert_eq!(entry.roll_no, "21001");
        assert_eq!(entry.password, "123");
        assert_eq!(entry.semester, 3);
        assert_eq!(entry.row_number, 2);
    }

    #[test]
    fn test_string_semester_accepted() {
        let entry = mapper()
            .map_row(&row(json!({
                "Name": "A", "RollNo": "R1", "Section": "A", "Password": "pw", "Semester": " 5 "
            })))
            .unwrap();
        assert_eq!(entry.semester, 5);
    }

    #[test]
    fn test_missing_and_blank_fields() {
        let result = mapper().map_row(&row(json!({
            "Name": "B", "RollNo": "  ", "Section": "B", "Password": 456
        })));
        assert_eq!(
            result,
            Err(RowRejection::MissingFields(vec!["RollNo", "Semester"]))
        );
    }

    #[test]
    fn test_numeric_zero_counts_as_missing() {
        let result = mapper().map_row(&row(json!({
            "Name": "A", "RollNo": "R1", "Section": "A", "Password": 0, "Semester": 0.0
        })));
        assert_eq!(
            result,
            Err(RowRejection::MissingFields(vec!["Password", "Semester"]))
        );

        // 文本 "0" 已填写，按学期区间校验
        let result = mapper().map_row(&row(json!({
            "Name": "A", "RollNo": "R1", "Section": "A", "Password": "0", "Semester": "0"
        })));
        assert!(matches!(
            result,
            Err(RowRejection::InvalidValue { field: "Semester", .. })
        ));
    }

    #[test]
    fn test_semester_out_of_range_or_fractional() {
        for bad in [json!(9), json!(2.5), json!("three")] {
            let result = mapper().map_row(&row(json!({
                "Name": "A", "RollNo": "R1", "Section": "A", "Password": "pw", "Semester": bad
            })));
            assert!(
                matches!(result, Err(RowRejection::InvalidValue { field: "Semester", .. })),
                "unexpected result for {:?}",
                result
            );
        }
    }
}
