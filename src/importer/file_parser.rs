// ==========================================
// 选修课注册系统 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls，字节流) / CSV (.csv)
// 约定: 只读取第一个工作表，表头为首个非空行
// ==========================================

use crate::domain::roster::ImportRow;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::roster_importer_trait::FileParser;
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use csv::ReaderBuilder;
use serde_json::{Map, Number, Value};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

// ==========================================
// ParsedSheet - 解析结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSheet {
    pub headers: Vec<String>,
    pub rows: Vec<ImportRow>,
}

impl ParsedSheet {
    /// 表头中缺失的必需列（保持 required 的顺序）
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|col| !self.headers.iter().any(|h| h == *col))
            .map(|col| col.to_string())
            .collect()
    }
}

// ==========================================
// 单元格 → JSON 值
// ==========================================
// 空单元格与纯空白字符串返回 None（不进入行数据）
fn cell_to_json(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty => None,
        Data::String(s) => {
            if s.trim().is_empty() {
                None
            } else {
                Some(Value::String(s.clone()))
            }
        }
        Data::Int(i) => Some(Value::Number(Number::from(*i))),
        Data::Float(f) => Some(
            Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(f.to_string())),
        ),
        Data::Bool(b) => Some(Value::Bool(*b)),
        other => {
            let text = other.to_string();
            if text.trim().is_empty() {
                None
            } else {
                Some(Value::String(text))
            }
        }
    }
}

/// 把工作表区域转换为表头 + 数据行
///
/// 行号为表格中的绝对行号（从 1 开始）；完全空白的行被跳过
pub fn rows_from_range(range: &Range<Data>) -> ParsedSheet {
    let header_line = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);

    let mut row_iter = range.rows();
    let headers: Vec<String> = match row_iter.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect(),
        None => return ParsedSheet::default(),
    };

    let mut rows = Vec::new();
    for (offset, data_row) in row_iter.enumerate() {
        let mut cells = Map::new();
        for (col_idx, cell) in data_row.iter().enumerate() {
            let header = match headers.get(col_idx) {
                Some(h) if !h.is_empty() => h,
                _ => continue,
            };
            if let Some(value) = cell_to_json(cell) {
                cells.insert(header.clone(), value);
            }
        }

        if cells.is_empty() {
            continue;
        }
        rows.push(ImportRow::new(header_line + 1 + offset, cells));
    }

    ParsedSheet { headers, rows }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<ParsedSheet> {
        if bytes.is_empty() {
            return Err(ImportError::EmptyPayload);
        }

        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

        let sheet_names = workbook.sheet_names();
        let first = match sheet_names.first() {
            Some(name) => name.clone(),
            None => return Err(ImportError::NoWorksheet),
        };
        if sheet_names.len() > 1 {
            warn!(
                sheet = %first,
                ignored = sheet_names.len() - 1,
                "工作簿包含多个工作表，仅读取第一个"
            );
        }

        let range = workbook.worksheet_range(&first)?;
        let parsed = rows_from_range(&range);
        debug!(sheet = %first, rows = parsed.rows.len(), "Excel 解析完成");
        Ok(parsed)
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<ParsedSheet> {
        if bytes.is_empty() {
            return Err(ImportError::EmptyPayload);
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(bytes);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let line = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(idx + 2);

            let mut cells = Map::new();
            for (col_idx, value) in record.iter().enumerate() {
                let header = match headers.get(col_idx) {
                    Some(h) if !h.is_empty() => h,
                    _ => continue,
                };
                if !value.trim().is_empty() {
                    cells.insert(header.clone(), Value::String(value.to_string()));
                }
            }

            // 跳过完全空白的行
            if cells.is_empty() {
                continue;
            }
            rows.push(ImportRow::new(line, cells));
        }

        debug!(rows = rows.len(), "CSV 解析完成");
        Ok(ParsedSheet { headers, rows })
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<ParsedSheet> {
        let path = file_path.as_ref();
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let parser: &dyn FileParser = match ext.as_str() {
            "csv" => &CsvParser,
            "xlsx" | "xls" => &ExcelParser,
            _ => return Err(ImportError::UnsupportedFormat(ext)),
        };

        let bytes = std::fs::read(path)?;
        parser.parse_bytes(&bytes)
    }
}
