// ==========================================
// 供应商目录导入 - 内存数据源 / 目标
// ==========================================
// 用途: 嵌入调用方自有存储、测试
// ==========================================

use crate::domain::catalog::{header_row, CatalogRow};
use crate::domain::types::{CellValue, Row};
use crate::importer::conflict_handler::DuplicateIndex;
use crate::importer::error::ImportResult;
use crate::importer::importer_trait::{CatalogSink, SourceRangeReader};

// ==========================================
// InMemorySource - 整表在内存中（首行为表头）
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    rows: Vec<Row>,
    reads: Vec<(usize, usize)>, // (起始行号, 返回行数)
}

impl InMemorySource {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            reads: Vec::new(),
        }
    }

    /// 已发生的区间读取记录
    pub fn reads(&self) -> &[(usize, usize)] {
        &self.reads
    }

    /// 曾被读取过的行号（1 起始）
    pub fn rows_read(&self) -> Vec<usize> {
        self.reads
            .iter()
            .flat_map(|(start, len)| *start..*start + *len)
            .collect()
    }
}

impl SourceRangeReader for InMemorySource {
    fn data_row_count(&mut self) -> ImportResult<usize> {
        Ok(self.rows.len().saturating_sub(1))
    }

    fn read_rows(&mut self, start_row: usize, count: usize) -> ImportResult<Vec<Row>> {
        let start = start_row.max(1) - 1;
        let rows: Vec<Row> = self.rows.iter().skip(start).take(count).cloned().collect();
        self.reads.push((start + 1, rows.len()));
        Ok(rows)
    }

    fn describe(&self) -> String {
        format!("memory({} rows)", self.rows.len())
    }
}

// ==========================================
// InMemorySink - 已提交 / 待提交分离
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct InMemorySink {
    committed: Vec<CatalogRow>,
    pending: Vec<CatalogRow>,
    appends: usize,
    flushes: usize,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已提交的行
    pub fn rows(&self) -> &[CatalogRow] {
        &self.committed
    }

    pub fn append_calls(&self) -> usize {
        self.appends
    }

    pub fn flush_calls(&self) -> usize {
        self.flushes
    }

    /// 以表格形式导出（表头 + 已提交行）
    pub fn to_table(&self) -> Vec<Row> {
        let header: Row = header_row().into_iter().map(CellValue::from).collect();
        std::iter::once(header)
            .chain(self.committed.iter().map(CatalogRow::to_cells))
            .collect()
    }

    /// 以已提交内容构建重复索引
    pub fn duplicate_index(&self) -> DuplicateIndex {
        DuplicateIndex::from_target_rows(&self.to_table())
    }
}

impl CatalogSink for InMemorySink {
    fn append_rows(&mut self, rows: &[CatalogRow]) -> ImportResult<()> {
        self.pending.extend_from_slice(rows);
        self.appends += 1;
        Ok(())
    }

    fn flush(&mut self) -> ImportResult<()> {
        self.committed.append(&mut self.pending);
        self.flushes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> Vec<Row> {
        vec![
            vec![CellValue::from("Title"), CellValue::from("SKU")],
            vec![CellValue::from("Ring"), CellValue::from("R1")],
            vec![CellValue::from("Bead"), CellValue::from("B1")],
        ]
    }

    #[test]
    fn test_source_reads_are_recorded() {
        let mut source = InMemorySource::new(sheet());
        assert_eq!(source.data_row_count().unwrap(), 2);

        let rows = source.read_rows(2, 5).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(source.reads(), &[(2, 2)]);
        assert_eq!(source.rows_read(), vec![2, 3]);
    }

    #[test]
    fn test_sink_pending_until_flush() {
        let sink = InMemorySink::new();
        assert!(sink.rows().is_empty());
        assert_eq!(sink.to_table().len(), 1);
        assert!(sink.duplicate_index().is_empty());
    }
}
