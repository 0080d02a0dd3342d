// ==========================================
// 供应商目录导入 - 批次协调器
// ==========================================
// 职责: 按窗口切分源区间，逐窗口 读取 → 抽取 → 构造 → 写入 → 提交
// 状态机: Idle → Running（逐窗口 Fetching → Extracting → Transforming → Writing）
//         → Completed | Failed(cursor)
// 约束:
// - 单线程顺序处理，一个窗口完整提交后才开始下一个
// - 内存峰值为一个窗口的行
// - 失败时游标指向最后一个已提交窗口的结束行，重新运行从 cursor+1 续传
// ==========================================

use crate::config::VendorConfig;
use crate::domain::catalog::CatalogRow;
use crate::domain::cursor::{
    BatchCursor, BatchPhase, BatchRunReport, ImportRun, RunState, RunStatus, HEADER_ROW,
};
use crate::domain::product::SkipReport;
use crate::domain::types::Row;
use crate::importer::catalog_row_builder::CatalogRowBuilder;
use crate::importer::conflict_handler::DuplicateIndex;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::{CatalogSink, SourceRangeReader};
use crate::importer::product_extractor::ProductExtractor;
use crate::repository::CheckpointRepository;
use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// BatchCoordinator
// ==========================================
pub struct BatchCoordinator<'a> {
    config: &'a VendorConfig,
    checkpoints: Option<&'a dyn CheckpointRepository>,
    run_key: String,
    state: RunState,
}

impl<'a> BatchCoordinator<'a> {
    pub fn new(config: &'a VendorConfig) -> Self {
        Self {
            config,
            checkpoints: None,
            run_key: config.run_key(),
            state: RunState::Idle,
        }
    }

    /// 挂载检查点仓储: 每个窗口提交后保存游标，完成后清除
    pub fn with_checkpoints(mut self, repo: &'a dyn CheckpointRepository) -> Self {
        self.checkpoints = Some(repo);
        self
    }

    pub fn with_run_key(mut self, run_key: impl Into<String>) -> Self {
        self.run_key = run_key.into();
        self
    }

    pub fn run_key(&self) -> &str {
        &self.run_key
    }

    /// 当前状态
    pub fn state(&self) -> RunState {
        self.state
    }

    /// 起始游标
    ///
    /// - fresh = true 或未开启 resumeOnError → 从第一条数据开始（并清除旧检查点）
    /// - 否则有检查点 → 从检查点续传
    pub fn start_cursor(&self, fresh: bool) -> ImportResult<BatchCursor> {
        let batch_size = self.config.batch_size;
        let Some(repo) = self.checkpoints else {
            return Ok(BatchCursor::new(batch_size));
        };

        if fresh || !self.config.resume_on_error {
            repo.clear(&self.run_key)?;
            return Ok(BatchCursor::new(batch_size));
        }

        match repo.load(&self.run_key)? {
            Some(checkpoint) => {
                let cursor = BatchCursor::resume_from(checkpoint, batch_size);
                info!(run_key = %self.run_key, "从检查点续传: {}", cursor);
                Ok(cursor)
            }
            None => Ok(BatchCursor::new(batch_size)),
        }
    }

    // ==========================================
    // 批量模式
    // ==========================================

    /// 逐窗口处理源区间 [start.next_start_row(), total_rows + 1]
    ///
    /// # 参数
    /// - total_rows: 源数据行数（不含表头）
    /// - source: 数据源（None → SourceNotFound，不做任何写入）
    /// - sink: 目标
    /// - duplicates: 运行开始前目标中已存在的 SKU
    /// - start: 起始游标（新运行或检查点恢复）
    ///
    /// # 返回
    /// - Ok(BatchRunReport): 完成
    /// - Err(BatchReadFailure / BatchWriteFailure): 携带最后成功游标，可续传
    #[instrument(skip(self, source, sink, duplicates, start), fields(vendor = %self.config.vendor, run_key = %self.run_key))]
    pub fn run<S, K>(
        &mut self,
        total_rows: usize,
        source: Option<&mut S>,
        sink: &mut K,
        duplicates: &DuplicateIndex,
        start: BatchCursor,
    ) -> ImportResult<BatchRunReport>
    where
        S: SourceRangeReader + ?Sized,
        K: CatalogSink + ?Sized,
    {
        let Some(source) = source else {
            error!("数据源不存在，未执行任何写入");
            self.state = RunState::Failed { cursor: start };
            return Err(ImportError::SourceNotFound(
                self.config.source_sheet.clone(),
            ));
        };

        let last_row = total_rows + HEADER_ROW;
        let extractor = ProductExtractor::new(self.config, duplicates);
        let builder = CatalogRowBuilder::new(self.config);
        let mut run = self.begin_run(&start);
        let mut cursor = start;
        let mut skipped = SkipReport::default();
        let mut windows_processed = 0usize;

        info!(
            source = %source.describe(),
            batch_size = cursor.batch_size,
            from_row = cursor.next_start_row(),
            last_row,
            "开始批量导入"
        );

        while !cursor.is_complete(last_row) {
            let window_start = cursor.next_start_row();
            let window_end = cursor.next_window_end(last_row);

            // 1. 读取窗口
            self.enter(window_start, window_end, BatchPhase::Fetching);
            let rows = match source.read_rows(window_start, window_end - window_start + 1) {
                Ok(rows) => rows,
                Err(e) => {
                    let err = ImportError::BatchReadFailure {
                        cursor,
                        window_start,
                        window_end,
                        message: e.to_string(),
                    };
                    return Err(self.fail(&mut run, cursor, &skipped, err));
                }
            };

            // 2. 抽取
            self.enter(window_start, window_end, BatchPhase::Extracting);
            let extraction = extractor.extract(&rows, window_start);
            skipped.merge(&extraction.skipped);

            // 3. 构造
            self.enter(window_start, window_end, BatchPhase::Transforming);
            let catalog_rows = builder.build_all(&extraction.products);

            // 4. 写入 + 提交
            self.enter(window_start, window_end, BatchPhase::Writing);
            if let Err(e) = write_window(sink, &catalog_rows) {
                let err = ImportError::BatchWriteFailure {
                    cursor,
                    window_start,
                    window_end,
                    message: e.to_string(),
                };
                return Err(self.fail(&mut run, cursor, &skipped, err));
            }

            cursor = cursor.advance(window_end, catalog_rows.len());
            windows_processed += 1;

            if let Err(e) = self.save_checkpoint(&cursor) {
                return Err(self.fail(&mut run, cursor, &skipped, e));
            }

            info!(
                window_start,
                window_end,
                imported = catalog_rows.len(),
                skipped = extraction.skipped.total(),
                total_imported = cursor.total_imported,
                "窗口已提交"
            );
        }

        self.complete(&mut run, cursor, &skipped)?;

        Ok(BatchRunReport {
            cursor,
            total_rows,
            windows_processed,
            skipped,
            state: self.state,
        })
    }

    // ==========================================
    // 单次模式（整表一次抽取、一次追加）
    // ==========================================

    /// 处理已完整载入的表（首行为表头）
    #[instrument(skip_all, fields(vendor = %self.config.vendor, rows = rows.len()))]
    pub fn run_single_pass<K>(
        &mut self,
        rows: &[Row],
        sink: &mut K,
        duplicates: &DuplicateIndex,
    ) -> ImportResult<BatchRunReport>
    where
        K: CatalogSink + ?Sized,
    {
        let total_rows = rows.len().saturating_sub(1);
        let last_row = total_rows + HEADER_ROW;
        let start = BatchCursor::new(total_rows);
        let window_start = start.next_start_row();
        let mut run = self.begin_run(&start);

        info!(total_rows, "开始单次导入");

        self.enter(window_start, last_row, BatchPhase::Extracting);
        let extraction = ProductExtractor::new(self.config, duplicates).extract_sheet(rows);

        self.enter(window_start, last_row, BatchPhase::Transforming);
        let catalog_rows = CatalogRowBuilder::new(self.config).build_all(&extraction.products);

        self.enter(window_start, last_row, BatchPhase::Writing);
        if let Err(e) = write_window(sink, &catalog_rows) {
            let err = ImportError::BatchWriteFailure {
                cursor: start,
                window_start,
                window_end: last_row,
                message: e.to_string(),
            };
            return Err(self.fail(&mut run, start, &extraction.skipped, err));
        }

        let cursor = start.advance(last_row, catalog_rows.len());
        self.complete(&mut run, cursor, &extraction.skipped)?;

        Ok(BatchRunReport {
            cursor,
            total_rows,
            windows_processed: 1,
            skipped: extraction.skipped,
            state: self.state,
        })
    }

    // ==========================================
    // 内部方法
    // ==========================================

    fn enter(&mut self, window_start: usize, window_end: usize, phase: BatchPhase) {
        self.state = RunState::Running {
            window_start,
            window_end,
            phase,
        };
        debug!(state = %self.state, "状态迁移");
    }

    fn save_checkpoint(&self, cursor: &BatchCursor) -> ImportResult<()> {
        if let Some(repo) = self.checkpoints {
            repo.save(&self.run_key, cursor)?;
        }
        Ok(())
    }

    fn begin_run(&self, start: &BatchCursor) -> ImportRun {
        let run = ImportRun {
            run_id: Uuid::new_v4().to_string(),
            run_key: self.run_key.clone(),
            vendor: self.config.vendor.clone(),
            status: RunStatus::Running,
            imported_rows: start.total_imported,
            skipped_rows: 0,
            last_row_processed: start.last_row_processed,
            started_at: Utc::now(),
            finished_at: None,
            message: None,
        };
        self.record_run(&run);
        run
    }

    fn complete(
        &mut self,
        run: &mut ImportRun,
        cursor: BatchCursor,
        skipped: &SkipReport,
    ) -> ImportResult<()> {
        if let Some(repo) = self.checkpoints {
            repo.clear(&self.run_key)?;
        }

        self.state = RunState::Completed;
        self.finish_run(run, RunStatus::Completed, cursor, skipped, None);

        info!(
            total_imported = cursor.total_imported,
            skipped = skipped.total(),
            unparseable_numeric = skipped.unparseable_numeric,
            "导入完成"
        );
        Ok(())
    }

    /// 进入 Failed 状态；检查点保持不动
    fn fail(
        &mut self,
        run: &mut ImportRun,
        cursor: BatchCursor,
        skipped: &SkipReport,
        err: ImportError,
    ) -> ImportError {
        error!(error = %err, "导入失败: {}", cursor);
        self.state = RunState::Failed { cursor };
        self.finish_run(run, RunStatus::Failed, cursor, skipped, Some(err.to_string()));
        err
    }

    fn finish_run(
        &self,
        run: &mut ImportRun,
        status: RunStatus,
        cursor: BatchCursor,
        skipped: &SkipReport,
        message: Option<String>,
    ) {
        run.status = status;
        run.imported_rows = cursor.total_imported;
        run.skipped_rows = skipped.total();
        run.last_row_processed = cursor.last_row_processed;
        run.finished_at = Some(Utc::now());
        run.message = message;
        self.record_run(run);
    }

    /// 运行记录写入失败不影响导入
    fn record_run(&self, run: &ImportRun) {
        if let Some(repo) = self.checkpoints {
            if let Err(e) = repo.record_run(run) {
                warn!(run_id = %run.run_id, error = %e, "运行记录写入失败");
            }
        }
    }
}

/// 一个窗口: 有行时一次追加 + 提交
fn write_window<K>(sink: &mut K, rows: &[CatalogRow]) -> ImportResult<()>
where
    K: CatalogSink + ?Sized,
{
    if rows.is_empty() {
        return Ok(());
    }
    sink.append_rows(rows)?;
    sink.flush()
}
