// ==========================================
// 供应商目录导入 - 源文件读取器
// ==========================================
// 支持: CSV (.csv) / Excel (.xlsx/.xlsm/.xls/.ods)
// CSV: 流式读取，窗口读取只持有当前窗口的行
// Excel: calamine 一次载入工作表区间，按窗口切片返回
// 约定: 单元格原样返回（不 trim），清洗由抽取器负责
// ==========================================

use crate::domain::types::{CellValue, Row};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::SourceRangeReader;
use calamine::{open_workbook_auto, Data, Range, Reader};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 按扩展名打开数据源
///
/// # 参数
/// - path: 源文件路径
/// - worksheet: Excel 工作表名（None → 第一个工作表）
pub fn open_source<P: AsRef<Path>>(
    path: P,
    worksheet: Option<&str>,
) -> ImportResult<Box<dyn SourceRangeReader>> {
    let path = path.as_ref();

    // 检查文件存在
    if !path.exists() {
        return Err(ImportError::SourceNotFound(path.display().to_string()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "csv" => Ok(Box::new(CsvSource::open(path)?)),
        "xlsx" | "xlsm" | "xls" | "ods" => Ok(Box::new(ExcelSource::open(path, worksheet)?)),
        _ => Err(ImportError::UnsupportedFormat(ext)),
    }
}

// ==========================================
// CSV 数据源
// ==========================================
pub struct CsvSource {
    path: PathBuf,
    reader: Option<csv::Reader<File>>,
    next_row: usize, // reader 下一条记录的行号
    row_count: Option<usize>,
}

impl CsvSource {
    pub fn open<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(ImportError::SourceNotFound(path.display().to_string()));
        }

        Ok(Self {
            path,
            reader: None,
            next_row: 1,
            row_count: None,
        })
    }

    fn open_reader(&self) -> ImportResult<csv::Reader<File>> {
        let file = File::open(&self.path)?;
        Ok(ReaderBuilder::new()
            .has_headers(false) // 表头按第 1 行返回，由调用方处理
            .flexible(true) // 允许行长度不一致
            .from_reader(file))
    }
}

impl SourceRangeReader for CsvSource {
    fn data_row_count(&mut self) -> ImportResult<usize> {
        if let Some(count) = self.row_count {
            return Ok(count);
        }

        let mut reader = self.open_reader()?;
        let mut record = StringRecord::new();
        let mut lines = 0usize;
        while reader.read_record(&mut record)? {
            lines += 1;
        }

        let count = lines.saturating_sub(1);
        self.row_count = Some(count);
        Ok(count)
    }

    fn read_rows(&mut self, start_row: usize, count: usize) -> ImportResult<Vec<Row>> {
        let start_row = start_row.max(1);

        // 只能前进；回退时重新打开
        if self.reader.is_none() || start_row < self.next_row {
            debug!(path = %self.path.display(), start_row, "打开 CSV 读取器");
            self.reader = Some(self.open_reader()?);
            self.next_row = 1;
        }
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| ImportError::InternalError("CSV 读取器未初始化".to_string()))?;

        let mut record = StringRecord::new();
        while self.next_row < start_row {
            if !reader.read_record(&mut record)? {
                return Ok(Vec::new());
            }
            self.next_row += 1;
        }

        let mut rows = Vec::with_capacity(count);
        while rows.len() < count {
            if !reader.read_record(&mut record)? {
                break;
            }
            self.next_row += 1;
            rows.push(record.iter().map(CellValue::from).collect());
        }

        Ok(rows)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// ==========================================
// Excel 数据源
// ==========================================
pub struct ExcelSource {
    path: PathBuf,
    sheet_name: String,
    range: Range<Data>,
}

impl ExcelSource {
    pub fn open<P: AsRef<Path>>(path: P, worksheet: Option<&str>) -> ImportResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(ImportError::SourceNotFound(path.display().to_string()));
        }

        let mut workbook = open_workbook_auto(&path)?;

        let sheet_name = match worksheet.map(str::trim).filter(|s| !s.is_empty()) {
            Some(name) => name.to_string(),
            None => workbook.sheet_names().first().cloned().ok_or_else(|| {
                ImportError::ExcelParseError("Excel 文件无工作表".to_string())
            })?,
        };

        if !workbook.sheet_names().iter().any(|s| s == &sheet_name) {
            return Err(ImportError::SourceNotFound(format!(
                "{}#{}",
                path.display(),
                sheet_name
            )));
        }

        let range = workbook.worksheet_range(&sheet_name)?;

        Ok(Self {
            path,
            sheet_name,
            range,
        })
    }

    /// 第 row_number 行（1 起始，绝对行号）
    fn row_at(&self, row_number: usize) -> Row {
        let Some((start_row, start_col)) = self.range.start() else {
            return Vec::new();
        };
        let (start_row, start_col) = (start_row as usize, start_col as usize);
        let index = row_number - 1;
        if index < start_row {
            return Vec::new();
        }

        let width = self.range.width();
        let mut row = vec![CellValue::Empty; start_col];
        row.extend((0..width).map(|c| {
            self.range
                .get((index - start_row, c))
                .map(cell_from_data)
                .unwrap_or_default()
        }));
        row
    }

    /// 最后一行的行号（1 起始）
    fn last_row(&self) -> usize {
        self.range.end().map(|(r, _)| r as usize + 1).unwrap_or(0)
    }
}

impl SourceRangeReader for ExcelSource {
    fn data_row_count(&mut self) -> ImportResult<usize> {
        Ok(self.last_row().saturating_sub(1))
    }

    fn read_rows(&mut self, start_row: usize, count: usize) -> ImportResult<Vec<Row>> {
        let start_row = start_row.max(1);
        let end_row = (start_row + count).min(self.last_row() + 1);
        Ok((start_row..end_row).map(|r| self.row_at(r)).collect())
    }

    fn describe(&self) -> String {
        format!("{}#{}", self.path.display(), self.sheet_name)
    }
}

/// calamine 单元格 → CellValue
fn cell_from_data(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::Int(i) => CellValue::from(*i),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) => CellValue::from(s.as_str()),
        other => CellValue::from(other.to_string()),
    }
}
