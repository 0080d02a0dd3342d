// ==========================================
// 供应商目录导入 - 数据源 / 目标 Trait
// ==========================================
// 职责: 定义核心与存储介质之间的接缝（不包含实现）
// 行号约定: 与表格一致，1 起始，第 1 行为表头
// ==========================================

use crate::domain::catalog::CatalogRow;
use crate::domain::types::Row;
use crate::importer::error::ImportResult;

// ==========================================
// SourceRangeReader Trait
// ==========================================
// 用途: 按区间读取源表行
// 实现者: CsvSource, ExcelSource, InMemorySource
pub trait SourceRangeReader {
    /// 数据行数（不含表头）
    fn data_row_count(&mut self) -> ImportResult<usize>;

    /// 读取一个区间的行
    ///
    /// # 参数
    /// - start_row: 起始行号（1 起始，含表头行号）
    /// - count: 行数
    ///
    /// # 返回
    /// - Ok(Vec<Row>): 区间内的行；越过表尾部分不返回
    /// - Err: 读取失败
    fn read_rows(&mut self, start_row: usize, count: usize) -> ImportResult<Vec<Row>>;

    /// 源的描述（日志用）
    fn describe(&self) -> String;
}

// ==========================================
// CatalogSink Trait
// ==========================================
// 用途: 追加目录行并提交
// 实现者: CsvCatalogSink, InMemorySink
pub trait CatalogSink {
    /// 一次追加多行（一个窗口的全部行）
    fn append_rows(&mut self, rows: &[CatalogRow]) -> ImportResult<()>;

    /// 提交已追加的行（返回后视为持久化）
    fn flush(&mut self) -> ImportResult<()>;
}
