// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的供应商配置、源表数据、可注入失败的目标等
// ==========================================
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use vendor_catalog_import::config::{CategoryRule, ColumnIndex, ColumnMapping, TagRule, TypeRule};
use vendor_catalog_import::domain::{CatalogRow, CellValue, Row};
use vendor_catalog_import::importer::{
    CatalogSink, ImportError, ImportResult, InMemorySink, InMemorySource, SourceRangeReader,
};
use vendor_catalog_import::VendorConfig;

/// 水晶饰品供应商配置
///
/// 列布局: 0 标题 / 1 描述 / 5 批发价 / 6 零售价 / 10 SKU / 11 数量
pub fn crystal_config() -> VendorConfig {
    VendorConfig {
        vendor: "Crystal Supply Co".to_string(),
        batch_size: 50,
        column_mappings: ColumnMapping {
            title: ColumnIndex::at(0),
            description: ColumnIndex::at(1),
            cost: ColumnIndex::at(5),
            price: ColumnIndex::at(6),
            sku: ColumnIndex::at(10),
            quantity: ColumnIndex::at(11),
            ..ColumnMapping::default()
        },
        category_rules: vec![
            CategoryRule {
                keywords: vec!["pendant".to_string(), "necklace".to_string()],
                category: "Apparel & Accessories > Jewelry".to_string(),
                priority: 10,
            },
            CategoryRule {
                keywords: vec!["tower".to_string(), "sphere".to_string()],
                category: "Home & Garden > Decor".to_string(),
                priority: 5,
            },
        ],
        type_rules: vec![
            TypeRule {
                keywords: vec!["pendant".to_string()],
                product_type: "Pendant".to_string(),
            },
            TypeRule {
                keywords: vec!["tower".to_string()],
                product_type: "Tower".to_string(),
            },
        ],
        tag_rules: vec![TagRule {
            keywords: vec!["amethyst".to_string()],
            tags: vec!["Amethyst".to_string(), "Purple Crystal".to_string()],
        }],
        ..VendorConfig::default()
    }
}

/// 以临时目录为源 / 目标 / 检查点库路径的配置
pub fn crystal_config_in(dir: &Path, source_file: &str) -> VendorConfig {
    VendorConfig {
        source_sheet: path_str(&dir.join(source_file)),
        target_sheet: path_str(&dir.join("out").join("catalog_products.csv")),
        checkpoint_db: Some(path_str(&dir.join("state").join("checkpoints.db"))),
        ..crystal_config()
    }
}

pub fn path_str(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// 供应商源表表头（12 列）
pub fn vendor_header() -> Row {
    [
        "Title", "Description", "Vendor Code", "Material", "Color", "Wholesale", "Retail",
        "Size", "Origin", "Notes", "SKU", "Qty",
    ]
    .into_iter()
    .map(CellValue::from)
    .collect()
}

/// 单行源数据
pub fn vendor_row(title: &str, description: &str, cost: f64, price: f64, sku: &str, qty: i64) -> Row {
    let mut row = vec![CellValue::Empty; 12];
    row[0] = CellValue::from(title);
    row[1] = CellValue::from(description);
    row[5] = CellValue::from(cost);
    row[6] = CellValue::from(price);
    row[10] = CellValue::from(sku);
    row[11] = CellValue::from(qty);
    row
}

/// 生成 n 条数据的源表（首行为表头）
///
/// 每 7 条中有 1 条缺 SKU，用于覆盖跳过统计
pub fn generate_sheet(n: usize) -> Vec<Row> {
    let titles = ["Amethyst Pendant", "Quartz Tower", "Rose Quartz Sphere", "Plain Stone"];
    let mut rows = vec![vendor_header()];
    for i in 0..n {
        let sku = if i % 7 == 6 {
            String::new()
        } else {
            format!("SKU{:04}", i)
        };
        let title = format!("{} {}", titles[i % titles.len()], i);
        rows.push(vendor_row(&title, "desc", 5.0, 12.0 + i as f64, &sku, (i % 5) as i64));
    }
    rows
}

/// 以 CSV 文件写出源表
pub fn write_sheet_csv(dir: &Path, name: &str, rows: &[Row]) -> PathBuf {
    let path = dir.join(name);
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(&path)
        .unwrap();
    for row in rows {
        writer
            .write_record(row.iter().map(|c| c.as_text()))
            .unwrap();
    }
    writer.flush().unwrap();
    path
}

/// 读回目标 CSV（含表头）
pub fn read_target_csv(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .unwrap();
    reader
        .records()
        .map(|r| r.unwrap().iter().map(|s| s.to_string()).collect())
        .collect()
}

pub fn temp_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

// ==========================================
// FlakySink - 第 N 次追加失败
// ==========================================
pub struct FlakySink {
    pub inner: InMemorySink,
    fail_on_append: Option<usize>,
    appends: usize,
}

impl FlakySink {
    pub fn failing_on(append: usize) -> Self {
        Self {
            inner: InMemorySink::new(),
            fail_on_append: Some(append),
            appends: 0,
        }
    }

    /// 恢复正常（模拟故障排除后重新运行）
    pub fn heal(&mut self) {
        self.fail_on_append = None;
    }
}

impl CatalogSink for FlakySink {
    fn append_rows(&mut self, rows: &[CatalogRow]) -> ImportResult<()> {
        self.appends += 1;
        if self.fail_on_append == Some(self.appends) {
            return Err(ImportError::SinkError("目标表写入超时".to_string()));
        }
        self.inner.append_rows(rows)
    }

    fn flush(&mut self) -> ImportResult<()> {
        self.inner.flush()
    }
}

// ==========================================
// FlakySource - 第 N 次区间读取失败
// ==========================================
pub struct FlakySource {
    pub inner: InMemorySource,
    fail_on_read: Option<usize>,
    reads: usize,
}

impl FlakySource {
    pub fn failing_on(rows: Vec<Row>, read: usize) -> Self {
        Self {
            inner: InMemorySource::new(rows),
            fail_on_read: Some(read),
            reads: 0,
        }
    }

    pub fn heal(&mut self) {
        self.fail_on_read = None;
    }
}

impl SourceRangeReader for FlakySource {
    fn data_row_count(&mut self) -> ImportResult<usize> {
        self.inner.data_row_count()
    }

    fn read_rows(&mut self, start_row: usize, count: usize) -> ImportResult<Vec<Row>> {
        self.reads += 1;
        if self.fail_on_read == Some(self.reads) {
            return Err(ImportError::SourceReadError("共享盘连接中断".to_string()));
        }
        self.inner.read_rows(start_row, count)
    }

    fn describe(&self) -> String {
        self.inner.describe()
    }
}
