// ==========================================
// 供应商目录导入 - 导入 API
// ==========================================
// 职责: 串联 配置校验 → 数据源 → 重复索引 → 目标 → 检查点 → 协调器
// 输出: ImportSummary（面向用户的单条结果信息）
// ==========================================

use crate::config::{has_blocking_issues, ConfigIssue, IssueLevel, VendorConfig};
use crate::domain::cursor::{BatchCursor, BatchRunReport, ImportRun, FIRST_DATA_ROW};
use crate::domain::product::SkipReport;
use crate::importer::{
    load_duplicate_index, open_source, BatchCoordinator, CatalogSink, CsvCatalogSink,
    DuplicateIndex, ImportError, ImportResult, SourceRangeReader,
};
use crate::repository::{CheckpointRepository, SqliteCheckpointRepository};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

// ==========================================
// ImportMode - 导入模式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportMode {
    #[default]
    Batched, // 按窗口批量，可续传
    SinglePass, // 整表一次处理
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportMode::Batched => write!(f, "BATCHED"),
            ImportMode::SinglePass => write!(f, "SINGLE_PASS"),
        }
    }
}

// ==========================================
// ImportSummary - 导入结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportOutcome {
    Completed,
    SourceNotFound {
        source: String,
    },
    ReadFailed {
        window_start: usize,
        cursor: BatchCursor,
        message: String,
    },
    WriteFailed {
        window_start: usize,
        cursor: BatchCursor,
        message: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    pub vendor: String,
    pub mode: ImportMode,
    pub outcome: ImportOutcome,
    pub imported: usize,       // 本次调用导入行数
    pub total_imported: usize, // 累计导入行数（含续传前）
    pub skipped: SkipReport,
    pub resumed_from_row: Option<usize>, // 续传起始行
}

impl ImportSummary {
    pub fn is_success(&self) -> bool {
        self.outcome == ImportOutcome::Completed
    }

    fn from_report(
        config: &VendorConfig,
        mode: ImportMode,
        start: &BatchCursor,
        report: BatchRunReport,
    ) -> Self {
        Self {
            vendor: config.vendor.clone(),
            mode,
            outcome: ImportOutcome::Completed,
            imported: report.total_imported() - start.total_imported,
            total_imported: report.total_imported(),
            skipped: report.skipped,
            resumed_from_row: resumed_from(start),
        }
    }

    /// 批次错误 / 源缺失 → 失败结果；其他错误原样返回
    fn from_error(
        config: &VendorConfig,
        mode: ImportMode,
        start: &BatchCursor,
        err: ImportError,
    ) -> ImportResult<Self> {
        let (outcome, cursor) = match err {
            ImportError::SourceNotFound(source) => {
                (ImportOutcome::SourceNotFound { source }, *start)
            }
            ImportError::BatchReadFailure {
                cursor,
                window_start,
                message,
                ..
            } => (
                ImportOutcome::ReadFailed {
                    window_start,
                    cursor,
                    message,
                },
                cursor,
            ),
            ImportError::BatchWriteFailure {
                cursor,
                window_start,
                message,
                ..
            } => (
                ImportOutcome::WriteFailed {
                    window_start,
                    cursor,
                    message,
                },
                cursor,
            ),
            other => return Err(other),
        };

        Ok(Self {
            vendor: config.vendor.clone(),
            mode,
            outcome,
            imported: cursor.total_imported - start.total_imported,
            total_imported: cursor.total_imported,
            skipped: SkipReport::default(),
            resumed_from_row: resumed_from(start),
        })
    }
}

fn resumed_from(start: &BatchCursor) -> Option<usize> {
    if start.total_imported > 0 || start.next_start_row() > FIRST_DATA_ROW {
        Some(start.next_start_row())
    } else {
        None
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            ImportOutcome::Completed => {
                write!(
                    f,
                    "{}: 导入 {} 行，跳过 {} 行",
                    self.vendor,
                    self.imported,
                    self.skipped.total()
                )?;
                if let Some(row) = self.resumed_from_row {
                    write!(f, "（自第 {} 行续传，累计 {} 行）", row, self.total_imported)?;
                }
                Ok(())
            }
            ImportOutcome::SourceNotFound { source } => {
                write!(f, "{}: 未找到数据源 {}，未写入任何数据", self.vendor, source)
            }
            ImportOutcome::ReadFailed {
                window_start,
                cursor,
                message,
            } => write!(
                f,
                "{}: 第 {} 行起读取失败（{}）；已提交至第 {} 行，重新运行可续传",
                self.vendor, window_start, message, cursor.last_row_processed
            ),
            ImportOutcome::WriteFailed {
                window_start,
                cursor,
                message,
            } => write!(
                f,
                "{}: 第 {} 行起写入失败（{}）；已提交至第 {} 行，重新运行可续传",
                self.vendor, window_start, message, cursor.last_row_processed
            ),
        }
    }
}

// ==========================================
// ConfigCheckReport - 配置检查结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigCheckReport {
    pub issues: Vec<ConfigIssue>,
    pub source_exists: bool,
    pub data_rows: Option<usize>,
    pub source_error: Option<String>,
    pub target_exists: bool,
    pub existing_skus: usize,
    pub target_error: Option<String>,
}

impl ConfigCheckReport {
    /// 无阻断问题，数据源与已有目标表均可读
    pub fn is_ready(&self) -> bool {
        !has_blocking_issues(&self.issues)
            && self.source_exists
            && self.source_error.is_none()
            && self.target_error.is_none()
    }
}

impl fmt::Display for ConfigCheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let errors = self
            .issues
            .iter()
            .filter(|i| i.level == IssueLevel::Error)
            .count();
        writeln!(
            f,
            "配置问题: {} 个错误 / {} 个警告",
            errors,
            self.issues.len() - errors
        )?;
        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }

        match (self.source_exists, self.data_rows, &self.source_error) {
            (false, _, _) => writeln!(f, "数据源: 不存在")?,
            (true, _, Some(e)) => writeln!(f, "数据源: 无法读取（{}）", e)?,
            (true, Some(rows), None) => writeln!(f, "数据源: {} 行数据", rows)?,
            (true, None, None) => writeln!(f, "数据源: 存在")?,
        }

        match (self.target_exists, &self.target_error) {
            (_, Some(e)) => writeln!(f, "目标表: 无法读取（{}）", e)?,
            (true, None) => writeln!(f, "目标表: 已存在（{} 个 SKU）", self.existing_skus)?,
            (false, None) => writeln!(f, "目标表: 不存在（首次导入时创建）")?,
        }

        write!(
            f,
            "{}",
            if self.is_ready() {
                "✅ 可以导入"
            } else {
                "❌ 请先修正以上问题"
            }
        )
    }
}

// ==========================================
// ImportApi
// ==========================================
#[derive(Default)]
pub struct ImportApi {
    checkpoints: Option<Arc<dyn CheckpointRepository>>,
}

impl ImportApi {
    /// 检查点库按配置路径打开
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用指定检查点仓储（嵌入 / 测试）
    pub fn with_checkpoints(checkpoints: Arc<dyn CheckpointRepository>) -> Self {
        Self {
            checkpoints: Some(checkpoints),
        }
    }

    fn checkpoints_for(&self, config: &VendorConfig) -> ImportResult<Arc<dyn CheckpointRepository>> {
        match &self.checkpoints {
            Some(repo) => Ok(Arc::clone(repo)),
            None => {
                let path = config.checkpoint_db_path();
                Ok(Arc::new(SqliteCheckpointRepository::open(&path)?))
            }
        }
    }

    /// 执行导入
    ///
    /// # 参数
    /// - config: 供应商配置
    /// - mode: 批量 / 单次
    /// - fresh: 忽略已有检查点，从第一条数据开始
    ///
    /// # 返回
    /// - Ok(ImportSummary): 完成、源缺失、窗口读写失败（可续传）
    /// - Err: 配置错误、格式不支持、检查点库错误
    pub fn import(
        &self,
        config: &VendorConfig,
        mode: ImportMode,
        fresh: bool,
    ) -> ImportResult<ImportSummary> {
        let issues = config.validate();
        for issue in &issues {
            warn!(field = %issue.field, "配置检查: {}", issue);
        }
        reject_blocking(&issues)?;

        info!(vendor = %config.vendor, mode = %mode, fresh, "开始导入");

        // 源缺失: 不打开目标，不触碰检查点
        let source = match open_source(&config.source_sheet, config.source_worksheet.as_deref())
        {
            Ok(source) => source,
            Err(ImportError::SourceNotFound(path)) => {
                warn!(source = %path, "数据源不存在");
                let start = BatchCursor::new(config.batch_size);
                return ImportSummary::from_error(
                    config,
                    mode,
                    &start,
                    ImportError::SourceNotFound(path),
                );
            }
            Err(e) => return Err(e),
        };

        let duplicates = if config.duplicate_handling.enabled {
            load_duplicate_index(&config.target_sheet)?
        } else {
            DuplicateIndex::new()
        };
        info!(existing_skus = duplicates.len(), "已加载目标表 SKU");

        match mode {
            ImportMode::Batched => self.import_batched(config, source, &duplicates, fresh),
            ImportMode::SinglePass => self.import_single_pass(config, source, &duplicates),
        }
    }

    /// 使用调用方提供的数据源与目标执行批量导入（嵌入场景）
    ///
    /// 检查点行为与 import(.., Batched, ..) 一致
    pub fn import_with<S, K>(
        &self,
        config: &VendorConfig,
        source: &mut S,
        sink: &mut K,
        duplicates: &DuplicateIndex,
        fresh: bool,
    ) -> ImportResult<ImportSummary>
    where
        S: SourceRangeReader + ?Sized,
        K: CatalogSink + ?Sized,
    {
        reject_blocking(&config.validate())?;
        self.run_batched(config, source, sink, duplicates, fresh)
    }

    fn import_batched(
        &self,
        config: &VendorConfig,
        mut source: Box<dyn SourceRangeReader>,
        duplicates: &DuplicateIndex,
        fresh: bool,
    ) -> ImportResult<ImportSummary> {
        let mut sink = CsvCatalogSink::open_or_init(&config.target_sheet)?;
        self.run_batched(config, source.as_mut(), &mut sink, duplicates, fresh)
    }

    fn run_batched<S, K>(
        &self,
        config: &VendorConfig,
        source: &mut S,
        sink: &mut K,
        duplicates: &DuplicateIndex,
        fresh: bool,
    ) -> ImportResult<ImportSummary>
    where
        S: SourceRangeReader + ?Sized,
        K: CatalogSink + ?Sized,
    {
        let mode = ImportMode::Batched;
        let total_rows = source.data_row_count()?;
        let checkpoints = self.checkpoints_for(config)?;
        let mut coordinator = BatchCoordinator::new(config).with_checkpoints(&*checkpoints);
        let start = coordinator.start_cursor(fresh)?;

        match coordinator.run(total_rows, Some(source), sink, duplicates, start) {
            Ok(report) => Ok(ImportSummary::from_report(config, mode, &start, report)),
            Err(e) => ImportSummary::from_error(config, mode, &start, e),
        }
    }

    fn import_single_pass(
        &self,
        config: &VendorConfig,
        mut source: Box<dyn SourceRangeReader>,
        duplicates: &DuplicateIndex,
    ) -> ImportResult<ImportSummary> {
        let mode = ImportMode::SinglePass;
        let start = BatchCursor::new(config.batch_size);

        let total_rows = source.data_row_count()?;
        let rows = source.read_rows(1, total_rows + 1)?;
        let mut sink = CsvCatalogSink::open_or_init(&config.target_sheet)?;

        match BatchCoordinator::new(config).run_single_pass(&rows, &mut sink, duplicates) {
            Ok(report) => Ok(ImportSummary::from_report(config, mode, &start, report)),
            Err(e) => ImportSummary::from_error(config, mode, &start, e),
        }
    }

    /// 配置检查（不写入任何数据）
    pub fn check_configuration(&self, config: &VendorConfig) -> ConfigCheckReport {
        let issues = config.validate();
        let source_exists = Path::new(&config.source_sheet).exists();

        let (data_rows, source_error) = if source_exists {
            match open_source(&config.source_sheet, config.source_worksheet.as_deref())
                .and_then(|mut s| s.data_row_count())
            {
                Ok(rows) => (Some(rows), None),
                Err(e) => (None, Some(e.to_string())),
            }
        } else {
            (None, None)
        };

        let target_exists = Path::new(&config.target_sheet).exists();
        let (existing_skus, target_error) = match load_duplicate_index(&config.target_sheet) {
            Ok(index) => (index.len(), None),
            Err(e) => (0, Some(e.to_string())),
        };

        ConfigCheckReport {
            issues,
            source_exists,
            data_rows,
            source_error,
            target_exists,
            existing_skus,
            target_error,
        }
    }

    /// 配置概览 + 待续传检查点 + 最近运行
    pub fn show_configuration(&self, config: &VendorConfig) -> ImportResult<String> {
        let checkpoints = self.checkpoints_for(config)?;
        let run_key = config.run_key();
        let mut out = config.summary();

        out.push_str("\n\n");
        match checkpoints.load(&run_key)? {
            Some(cursor) => out.push_str(&format!("待续传: {}\n", cursor)),
            None => out.push_str("待续传: 无\n"),
        }

        let runs = checkpoints.list_runs(&run_key)?;
        if let Some(last) = runs.first() {
            out.push_str(&format_run(last));
        }
        Ok(out)
    }
}

/// 首个 Error 级问题 → ConfigValueError
fn reject_blocking(issues: &[ConfigIssue]) -> ImportResult<()> {
    match issues.iter().find(|i| i.level == IssueLevel::Error) {
        Some(issue) => Err(ImportError::ConfigValueError {
            key: issue.field.clone(),
            value: String::new(),
            message: issue.message.clone(),
        }),
        None => Ok(()),
    }
}

fn format_run(run: &ImportRun) -> String {
    format!(
        "最近运行: {} {} 导入 {} / 跳过 {} / 最后行 {}（{}）",
        run.started_at.format("%Y-%m-%d %H:%M:%S"),
        run.status,
        run.imported_rows,
        run.skipped_rows,
        run.last_row_processed,
        run.message.as_deref().unwrap_or("-")
    )
}
