// ==========================================
// 供应商目录导入 - 商品抽取器
// ==========================================
// 职责: 原始行 → 已校验、已去重的 SKU → Product 映射
// 流程（逐行）:
// 1. 读取 title / sku，任一为空或等于表头文本 → 跳过
// 2. SKU 在重复索引中且去重动作为 skip → 跳过
// 3. 价格 <= 0（含无法解析）→ 跳过
// 4. 数量缺失 / 无法解析 / 为 0 → defaultQuantityWhenMissing
// 5. 成本、重量无法解析 → 0
// 6. 写入映射，同批次重复 SKU 后者覆盖前者
// 红线: 任何行都不会导致失败，只会降级或跳过
// ==========================================

use crate::config::{ColumnMapping, VendorConfig};
use crate::domain::cursor::FIRST_DATA_ROW;
use crate::domain::product::{Extraction, Product};
use crate::domain::types::{CellValue, SkipReason};
use crate::engine::column_accessor;
use crate::importer::conflict_handler::DuplicateIndex;
use crate::importer::data_cleaner::{DataCleaner, NumericCell};
use tracing::{debug, warn};

/// 区间内可能回显的表头文本
const HEADER_TITLE: &str = "Title";
const HEADER_SKU: &str = "SKU";

// ==========================================
// ProductExtractor
// ==========================================
pub struct ProductExtractor<'a> {
    mapping: &'a ColumnMapping,
    duplicates: &'a DuplicateIndex,
    skip_duplicates: bool,
    default_quantity: i64,
    cleaner: DataCleaner,
}

impl<'a> ProductExtractor<'a> {
    pub fn new(config: &'a VendorConfig, duplicates: &'a DuplicateIndex) -> Self {
        Self {
            mapping: &config.column_mappings,
            duplicates,
            skip_duplicates: config.duplicate_handling.skips_existing(),
            default_quantity: config.default_quantity_when_missing,
            cleaner: DataCleaner,
        }
    }

    /// 抽取整张表（首行为表头，跳过）
    pub fn extract_sheet(&self, rows: &[Vec<CellValue>]) -> Extraction {
        let data = rows.get(1..).unwrap_or(&[]);
        self.extract(data, FIRST_DATA_ROW)
    }

    /// 抽取一个已切好的窗口
    ///
    /// first_row_number 为首行在表中的行号（1 起始），仅用于日志
    pub fn extract(&self, rows: &[Vec<CellValue>], first_row_number: usize) -> Extraction {
        let mut extraction = Extraction::default();

        for (offset, row) in rows.iter().enumerate() {
            let row_number = first_row_number + offset;
            match self.extract_row(row, &mut extraction) {
                Ok(product) => {
                    debug!(row = row_number, sku = %product.sku, "抽取商品: {}", product.title);
                    if extraction.products.insert(product).is_some() {
                        extraction.skipped.overwritten += 1;
                    }
                }
                Err(reason) => {
                    warn!(row = row_number, reason = %reason, "跳过行");
                    extraction.skipped.record(reason);
                }
            }
        }

        extraction
    }

    fn extract_row(
        &self,
        row: &[CellValue],
        extraction: &mut Extraction,
    ) -> Result<Product, SkipReason> {
        let cleaner = &self.cleaner;

        // 1. 标题 / SKU
        let title = cleaner.clean_text(column_accessor::value(row, self.mapping.title));
        let sku = cleaner.clean_text(column_accessor::value(row, self.mapping.sku));
        if title.is_empty() {
            return Err(SkipReason::MissingTitle);
        }
        if sku.is_empty() {
            return Err(SkipReason::MissingSku);
        }
        if title == HEADER_TITLE || sku == HEADER_SKU {
            return Err(SkipReason::HeaderEcho);
        }

        // 2. 重复 SKU
        if self.skip_duplicates && self.duplicates.contains(&sku) {
            return Err(SkipReason::DuplicateSku);
        }

        // 3. 价格
        let price = self.decimal(row, self.mapping.price, extraction);
        if price <= 0.0 {
            return Err(SkipReason::NonPositivePrice);
        }

        // 4-5. 数量、成本、重量
        // 数值 0 在读取时已折叠为空，文本 "0" 同样按缺失处理，CSV 与 Excel 结果一致
        let quantity = match cleaner.parse_integer(column_accessor::value(row, self.mapping.quantity)) {
            NumericCell::Parsed(q) if q != 0 => q,
            NumericCell::Parsed(_) | NumericCell::Missing => self.default_quantity,
            NumericCell::Unparseable => {
                extraction.skipped.unparseable_numeric += 1;
                self.default_quantity
            }
        };
        let cost = self.decimal(row, self.mapping.cost, extraction);
        let weight = self.decimal(row, self.mapping.weight, extraction);
        let description = cleaner.clean_text(column_accessor::value(row, self.mapping.description));

        // 6. 构造（不变量由 Product::new 兜底）
        Product::new(&sku, &title, price, cost, quantity, weight, &description)
            .ok_or(SkipReason::NonPositivePrice)
    }

    /// 小数字段: 空 → 0，无法解析 → 0 并计数
    fn decimal(
        &self,
        row: &[CellValue],
        column: crate::config::ColumnIndex,
        extraction: &mut Extraction,
    ) -> f64 {
        let parsed = self.cleaner.parse_decimal(column_accessor::value(row, column));
        if parsed.is_unparseable() {
            extraction.skipped.unparseable_numeric += 1;
        }
        parsed.value_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnIndex;
    use crate::domain::types::DuplicateAction;

    fn config() -> VendorConfig {
        VendorConfig {
            column_mappings: ColumnMapping {
                title: ColumnIndex::at(0),
                description: ColumnIndex::at(1),
                cost: ColumnIndex::at(5),
                price: ColumnIndex::at(6),
                sku: ColumnIndex::at(10),
                quantity: ColumnIndex::at(11),
                ..ColumnMapping::default()
            },
            ..VendorConfig::default()
        }
    }

    fn row(title: &str, sku: &str, price: CellValue, quantity: CellValue) -> Vec<CellValue> {
        let mut row = vec![CellValue::Empty; 12];
        row[0] = CellValue::from(title);
        row[1] = CellValue::from("desc");
        row[5] = CellValue::Number(5.0);
        row[6] = price;
        row[10] = CellValue::from(sku);
        row[11] = quantity;
        row
    }

    #[test]
    fn test_extract_valid_row() {
        let config = config();
        let duplicates = DuplicateIndex::new();
        let extractor = ProductExtractor::new(&config, &duplicates);

        let rows = vec![row(
            "Amethyst Pendant",
            "SKU001",
            CellValue::Number(12.0),
            CellValue::Number(3.0),
        )];
        let out = extractor.extract(&rows, 2);

        let product = out.products.get("SKU001").unwrap();
        assert_eq!(product.title, "Amethyst Pendant");
        assert_eq!(product.price, 12.0);
        assert_eq!(product.cost, 5.0);
        assert_eq!(product.quantity, 3);
        assert_eq!(product.description, "desc");
        assert_eq!(out.skipped.total(), 0);
    }

    #[test]
    fn test_skip_reasons() {
        let config = config();
        let duplicates = DuplicateIndex::from_skus(["DUP"]);
        let extractor = ProductExtractor::new(&config, &duplicates);

        let rows = vec![
            row("", "A", CellValue::Number(1.0), CellValue::Empty),
            row("No Sku", "", CellValue::Number(1.0), CellValue::Empty),
            row("Title", "SKU", CellValue::from("Retail"), CellValue::Empty),
            row("Dup", " DUP ", CellValue::Number(1.0), CellValue::Empty),
            row("Free", "B", CellValue::Number(0.0), CellValue::Empty),
            row("Negative", "C", CellValue::Number(-4.0), CellValue::Empty),
            row("Junk", "D", CellValue::from("call us"), CellValue::Empty),
        ];
        let out = extractor.extract(&rows, 2);

        assert!(out.products.is_empty());
        assert_eq!(out.skipped.count(SkipReason::MissingTitle), 1);
        assert_eq!(out.skipped.count(SkipReason::MissingSku), 1);
        assert_eq!(out.skipped.count(SkipReason::HeaderEcho), 1);
        assert_eq!(out.skipped.count(SkipReason::DuplicateSku), 1);
        assert_eq!(out.skipped.count(SkipReason::NonPositivePrice), 3);
        assert_eq!(out.skipped.unparseable_numeric, 1);
    }

    #[test]
    fn test_duplicate_replace_does_not_skip() {
        let mut config = config();
        config.duplicate_handling.action = DuplicateAction::Replace;
        let duplicates = DuplicateIndex::from_skus(["SKU001"]);
        let extractor = ProductExtractor::new(&config, &duplicates);

        let rows = vec![row("Ring", "SKU001", CellValue::Number(9.0), CellValue::Empty)];
        assert_eq!(extractor.extract(&rows, 2).products.len(), 1);
    }

    #[test]
    fn test_duplicate_handling_disabled() {
        let mut config = config();
        config.duplicate_handling.enabled = false;
        let duplicates = DuplicateIndex::from_skus(["SKU001"]);
        let extractor = ProductExtractor::new(&config, &duplicates);

        let rows = vec![row("Ring", "SKU001", CellValue::Number(9.0), CellValue::Empty)];
        assert_eq!(extractor.extract(&rows, 2).products.len(), 1);
    }

    #[test]
    fn test_quantity_default_is_configurable() {
        let mut config = config();
        let duplicates = DuplicateIndex::new();
        let rows = vec![
            row("A", "A1", CellValue::Number(2.0), CellValue::Empty),
            row("B", "B1", CellValue::Number(2.0), CellValue::from("lots")),
        ];

        let out = ProductExtractor::new(&config, &duplicates).extract(&rows, 2);
        assert_eq!(out.products.get("A1").unwrap().quantity, 0);
        assert_eq!(out.products.get("B1").unwrap().quantity, 0);

        config.default_quantity_when_missing = 1;
        let out = ProductExtractor::new(&config, &duplicates).extract(&rows, 2);
        assert_eq!(out.products.get("A1").unwrap().quantity, 1);
        assert_eq!(out.products.get("B1").unwrap().quantity, 1);
        assert_eq!(out.skipped.unparseable_numeric, 1);
    }

    #[test]
    fn test_zero_quantity_same_for_numeric_and_text_cells() {
        let mut config = config();
        config.default_quantity_when_missing = 1;
        let duplicates = DuplicateIndex::new();
        let rows = vec![
            row("Excel Zero", "X0", CellValue::Number(2.0), CellValue::Number(0.0)),
            row("Csv Zero", "C0", CellValue::Number(2.0), CellValue::from("0")),
            row("Csv Decimal", "C1", CellValue::Number(2.0), CellValue::from("0.4")),
            row("Csv Four", "C4", CellValue::Number(2.0), CellValue::from("4")),
        ];

        let out = ProductExtractor::new(&config, &duplicates).extract(&rows, 2);
        assert_eq!(out.products.get("X0").unwrap().quantity, 1);
        assert_eq!(out.products.get("C0").unwrap().quantity, 1);
        assert_eq!(out.products.get("C1").unwrap().quantity, 1);
        assert_eq!(out.products.get("C4").unwrap().quantity, 4);
        assert_eq!(out.skipped.unparseable_numeric, 0);
    }

    #[test]
    fn test_same_batch_duplicate_overwrites() {
        let config = config();
        let duplicates = DuplicateIndex::new();
        let extractor = ProductExtractor::new(&config, &duplicates);

        let rows = vec![
            row("First", "X", CellValue::Number(1.0), CellValue::Empty),
            row("Second", "X", CellValue::Number(2.0), CellValue::Empty),
        ];
        let out = extractor.extract(&rows, 2);

        assert_eq!(out.products.len(), 1);
        assert_eq!(out.products.get("X").unwrap().title, "Second");
        assert_eq!(out.skipped.overwritten, 1);
    }

    #[test]
    fn test_extract_sheet_skips_header() {
        let config = config();
        let duplicates = DuplicateIndex::new();
        let extractor = ProductExtractor::new(&config, &duplicates);

        let rows = vec![
            row("Product Name", "Code", CellValue::from("Retail"), CellValue::Empty),
            row("Ring", "R1", CellValue::Number(4.0), CellValue::Empty),
        ];
        let out = extractor.extract_sheet(&rows);

        assert_eq!(out.products.len(), 1);
        assert_eq!(out.skipped.total(), 0);
    }
}
