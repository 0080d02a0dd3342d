// ==========================================
// 供应商目录导入 - 重复 SKU 索引
// ==========================================
// 职责: 运行开始前目标中已存在的 SKU 集合
// 来源: 目标表 Variant SKU 列（第 17 列，0 起始），跳过表头
// 红线: 抽取阶段只读，运行中不修改
// ==========================================

use crate::domain::catalog::CatalogColumn;
use crate::domain::types::CellValue;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateIndex {
    skus: HashSet<String>,
}

impl DuplicateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 SKU 列表构建（trim，忽略空值）
    pub fn from_skus<I, S>(skus: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let skus = skus
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Self { skus }
    }

    /// 从目标表全部行构建（首行为表头）
    pub fn from_target_rows(rows: &[Vec<CellValue>]) -> Self {
        let column = CatalogColumn::VariantSku.index();
        Self::from_skus(
            rows.iter()
                .skip(1)
                .filter_map(|row| row.get(column))
                .map(|cell| cell.as_text()),
        )
    }

    pub fn contains(&self, sku: &str) -> bool {
        self.skus.contains(sku.trim())
    }

    pub fn len(&self) -> usize {
        self.skus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skus.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::CATALOG_WIDTH;

    fn target_row(sku: &str) -> Vec<CellValue> {
        let mut row = vec![CellValue::Empty; CATALOG_WIDTH];
        row[17] = CellValue::from(sku);
        row
    }

    #[test]
    fn test_from_target_rows_skips_header() {
        let rows = vec![
            target_row("Variant SKU"),
            target_row(" SKU001 "),
            target_row(""),
            target_row("SKU002"),
            vec![CellValue::from("short row")],
        ];
        let index = DuplicateIndex::from_target_rows(&rows);

        assert_eq!(index.len(), 2);
        assert!(index.contains("SKU001"));
        assert!(index.contains(" SKU002"));
        assert!(!index.contains("Variant SKU"));
    }

    #[test]
    fn test_empty_index() {
        let index = DuplicateIndex::new();
        assert!(index.is_empty());
        assert!(!index.contains("X"));
    }
}
