// ==========================================
// 供应商目录导入 - 批次游标与运行状态
// ==========================================
// 行号约定: 与表格一致，1 起始，第 1 行为表头，数据从第 2 行开始
// 生命周期: 运行开始创建（或从检查点恢复）→ 每批提交后推进
//           → 成功完成后丢弃 / 失败时保留供下次续传
// ==========================================

use crate::domain::product::SkipReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 表头所在行
pub const HEADER_ROW: usize = 1;

/// 第一条数据所在行
pub const FIRST_DATA_ROW: usize = 2;

// ==========================================
// BatchCursor - 批次游标
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCursor {
    pub start_row: usize,          // 本次运行起始行
    pub batch_size: usize,         // 窗口大小
    pub last_row_processed: usize, // 最后一个已提交窗口的结束行（HEADER_ROW 表示尚未处理）
    pub total_imported: usize,     // 累计导入行数
}

impl BatchCursor {
    /// 新运行的初始游标
    pub fn new(batch_size: usize) -> Self {
        Self {
            start_row: FIRST_DATA_ROW,
            batch_size: batch_size.max(1),
            last_row_processed: HEADER_ROW,
            total_imported: 0,
        }
    }

    /// 从检查点恢复: 沿用已提交进度，窗口大小以本次配置为准
    pub fn resume_from(checkpoint: BatchCursor, batch_size: usize) -> Self {
        let last_row_processed = checkpoint.last_row_processed.max(HEADER_ROW);
        Self {
            start_row: last_row_processed + 1,
            batch_size: batch_size.max(1),
            last_row_processed,
            total_imported: checkpoint.total_imported,
        }
    }

    /// 下一个窗口的起始行
    pub fn next_start_row(&self) -> usize {
        self.last_row_processed + 1
    }

    /// 下一个窗口的结束行（不超过 last_row）
    pub fn next_window_end(&self, last_row: usize) -> usize {
        (self.next_start_row() + self.batch_size - 1).min(last_row)
    }

    /// 是否已处理到 last_row
    pub fn is_complete(&self, last_row: usize) -> bool {
        self.last_row_processed >= last_row
    }

    /// 提交一个窗口后推进（返回新游标，原值不变）
    pub fn advance(&self, window_end: usize, imported: usize) -> Self {
        Self {
            last_row_processed: window_end,
            total_imported: self.total_imported + imported,
            ..*self
        }
    }
}

impl fmt::Display for BatchCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "已提交至第 {} 行（累计导入 {}）",
            self.last_row_processed, self.total_imported
        )
    }
}

// ==========================================
// BatchPhase - 单个窗口内的处理阶段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchPhase {
    Fetching,     // 读取窗口行
    Extracting,   // 抽取商品
    Transforming, // 构造目录行
    Writing,      // 追加写入 + 提交
}

impl fmt::Display for BatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchPhase::Fetching => write!(f, "FETCHING"),
            BatchPhase::Extracting => write!(f, "EXTRACTING"),
            BatchPhase::Transforming => write!(f, "TRANSFORMING"),
            BatchPhase::Writing => write!(f, "WRITING"),
        }
    }
}

// ==========================================
// RunState - 批量运行状态机
// ==========================================
// Idle → Running → (逐窗口: Fetching → Extracting → Transforming → Writing)
//      → Completed | Failed(cursor)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    Idle,
    Running {
        window_start: usize,
        window_end: usize,
        phase: BatchPhase,
    },
    Completed,
    Failed {
        cursor: BatchCursor,
    },
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Completed | RunState::Failed { .. })
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => write!(f, "IDLE"),
            RunState::Running {
                window_start,
                window_end,
                phase,
            } => write!(f, "RUNNING[{}-{}:{}]", window_start, window_end, phase),
            RunState::Completed => write!(f, "COMPLETED"),
            RunState::Failed { cursor } => write!(f, "FAILED({})", cursor),
        }
    }
}

// ==========================================
// BatchRunReport - 批量运行结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRunReport {
    pub cursor: BatchCursor,    // 最终游标
    pub total_rows: usize,      // 源数据行数（不含表头）
    pub windows_processed: usize, // 本次调用处理的窗口数
    pub skipped: SkipReport,    // 跳过统计（本次调用）
    pub state: RunState,        // 终态
}

impl BatchRunReport {
    /// 累计导入行数（含续传前已导入部分）
    pub fn total_imported(&self) -> usize {
        self.cursor.total_imported
    }
}

// ==========================================
// RunStatus / ImportRun - 导入运行记录
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Running => write!(f, "RUNNING"),
            RunStatus::Completed => write!(f, "COMPLETED"),
            RunStatus::Failed => write!(f, "FAILED"),
        }
    }
}

impl RunStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "COMPLETED" => RunStatus::Completed,
            "FAILED" => RunStatus::Failed,
            _ => RunStatus::Running,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRun {
    pub run_id: String,                       // 运行 ID（UUID）
    pub run_key: String,                      // 检查点键（供应商 + 源 + 目标）
    pub vendor: String,                       // 供应商
    pub status: RunStatus,                    // 运行状态
    pub imported_rows: usize,                 // 累计导入行数
    pub skipped_rows: usize,                  // 本次跳过行数
    pub last_row_processed: usize,            // 最后提交行
    pub started_at: DateTime<Utc>,            // 开始时间
    pub finished_at: Option<DateTime<Utc>>,   // 结束时间
    pub message: Option<String>,              // 失败原因等
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_cursor_points_at_first_data_row() {
        let cursor = BatchCursor::new(50);
        assert_eq!(cursor.next_start_row(), 2);
        assert_eq!(cursor.next_window_end(121), 51);
        assert!(!cursor.is_complete(121));
    }

    #[test]
    fn test_last_window_is_shorter() {
        // 120 条数据 → 第 2..121 行
        let cursor = BatchCursor::new(50).advance(51, 10).advance(101, 10);
        assert_eq!(cursor.next_start_row(), 102);
        assert_eq!(cursor.next_window_end(121), 121);
        assert_eq!(cursor.total_imported, 20);

        let done = cursor.advance(121, 5);
        assert!(done.is_complete(121));
        assert_eq!(done.total_imported, 25);
    }

    #[test]
    fn test_zero_batch_size_is_clamped() {
        let cursor = BatchCursor::new(0);
        assert_eq!(cursor.batch_size, 1);
        assert_eq!(cursor.next_window_end(10), 2);
    }

    #[test]
    fn test_resume_from_checkpoint() {
        let checkpoint = BatchCursor::new(50).advance(51, 40);
        let resumed = BatchCursor::resume_from(checkpoint, 20);

        assert_eq!(resumed.start_row, 52);
        assert_eq!(resumed.batch_size, 20);
        assert_eq!(resumed.next_start_row(), 52);
        assert_eq!(resumed.total_imported, 40);
    }

    #[test]
    fn test_run_state_terminal() {
        assert!(!RunState::Idle.is_terminal());
        assert!(RunState::Completed.is_terminal());
        assert!(RunState::Failed {
            cursor: BatchCursor::new(10)
        }
        .is_terminal());
    }
}
