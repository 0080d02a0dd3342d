// ==========================================
// 供应商目录导入 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 约定: 行级问题（InvalidRow / UnparseableNumeric）不走 Err，
//       计入 SkipReport；只有源缺失、窗口读写失败会中止运行
// ==========================================

use crate::domain::cursor::BatchCursor;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 数据源错误 =====
    #[error("数据源不存在: {0}")]
    SourceNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .csv/.xlsx/.xls/.ods）")]
    UnsupportedFormat(String),

    #[error("数据源读取失败: {0}")]
    SourceReadError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    // ===== 批次错误（可续传，携带最后成功游标） =====
    #[error("窗口读取失败 (行 {window_start}-{window_end}): {message}；{cursor}，重新运行可续传")]
    BatchReadFailure {
        cursor: BatchCursor,
        window_start: usize,
        window_end: usize,
        message: String,
    },

    #[error("窗口写入失败 (行 {window_start}-{window_end}): {message}；{cursor}，重新运行可续传")]
    BatchWriteFailure {
        cursor: BatchCursor,
        window_start: usize,
        window_end: usize,
        message: String,
    },

    #[error("目标写入失败: {0}")]
    SinkError(String),

    // ===== 配置错误 =====
    #[error("配置读取失败 (path: {path}): {message}")]
    ConfigReadError { path: String, message: String },

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },

    // ===== 检查点错误 =====
    #[error("检查点读写失败: {0}")]
    CheckpointError(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ImportError {
    /// 失败时的最后成功游标（仅批次错误携带）
    pub fn cursor(&self) -> Option<BatchCursor> {
        match self {
            ImportError::BatchReadFailure { cursor, .. }
            | ImportError::BatchWriteFailure { cursor, .. } => Some(*cursor),
            _ => None,
        }
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::SourceReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

// 实现 From<serde_json::Error>
impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::ConfigValueError {
            key: "<json>".to_string(),
            value: format!("line {}, column {}", err.line(), err.column()),
            message: err.to_string(),
        }
    }
}

// 实现 From<RepositoryError>
impl From<RepositoryError> for ImportError {
    fn from(err: RepositoryError) -> Self {
        ImportError::CheckpointError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_failure_carries_cursor() {
        let cursor = BatchCursor::new(50).advance(51, 12);
        let err = ImportError::BatchWriteFailure {
            cursor,
            window_start: 52,
            window_end: 101,
            message: "disk full".to_string(),
        };

        assert_eq!(err.cursor(), Some(cursor));
        let text = err.to_string();
        assert!(text.contains("52-101"));
        assert!(text.contains("disk full"));
    }

    #[test]
    fn test_source_not_found_carries_no_cursor() {
        let err = ImportError::SourceNotFound("VendorOrder.csv".to_string());
        assert!(err.cursor().is_none());
        assert!(err.to_string().contains("VendorOrder.csv"));
    }

    #[test]
    fn test_repository_error_conversion() {
        let err: ImportError = RepositoryError::LockError("poisoned".to_string()).into();
        assert!(matches!(err, ImportError::CheckpointError(_)));
    }
}
