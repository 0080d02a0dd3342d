// ==========================================
// 供应商目录导入 - CSV 目录写出
// ==========================================
// 职责: 目标 CSV 的初始化、追加与提交
// 规则:
// - 目标不存在或为空 → 写入 39 列表头
// - 已存在 → 追加（不改写已有行）
// - flush = 缓冲写出 + fsync
// ==========================================

use crate::domain::catalog::{header_row, CatalogColumn, CatalogRow};
use crate::importer::conflict_handler::DuplicateIndex;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::CatalogSink;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub struct CsvCatalogSink {
    path: PathBuf,
    writer: csv::Writer<File>,
    rows_written: usize,
}

impl CsvCatalogSink {
    /// 打开目标 CSV；不存在或为空时初始化表头
    pub fn open_or_init<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        let path = path.as_ref().to_path_buf();
        let is_new = std::fs::metadata(&path).map(|m| m.len() == 0).unwrap_or(true);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(sink_error)?;
            }
        }

        if !is_new {
            ensure_trailing_newline(&path)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(sink_error)?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

        if is_new {
            writer.write_record(header_row()).map_err(sink_error)?;
            writer.flush().map_err(sink_error)?;
            info!(path = %path.display(), columns = CatalogColumn::ALL.len(), "初始化目标表表头");
        }

        Ok(Self {
            path,
            writer,
            rows_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 本次打开后追加的行数
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }
}

impl CatalogSink for CsvCatalogSink {
    fn append_rows(&mut self, rows: &[CatalogRow]) -> ImportResult<()> {
        for row in rows {
            self.writer
                .write_record(row.to_record())
                .map_err(sink_error)?;
        }
        self.rows_written += rows.len();
        Ok(())
    }

    fn flush(&mut self) -> ImportResult<()> {
        self.writer.flush().map_err(sink_error)?;
        self.writer.get_ref().sync_all().map_err(sink_error)?;
        Ok(())
    }
}

/// 读取目标表已存在的 SKU（首行为表头；目标不存在 → 空索引）
pub fn load_duplicate_index<P: AsRef<Path>>(path: P) -> ImportResult<DuplicateIndex> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(DuplicateIndex::new());
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let column = CatalogColumn::VariantSku.index();
    let mut record = StringRecord::new();
    let mut skus = Vec::new();
    let mut is_header = true;
    while reader.read_record(&mut record)? {
        if is_header {
            is_header = false;
            continue;
        }
        if let Some(sku) = record.get(column) {
            skus.push(sku.to_string());
        }
    }

    Ok(DuplicateIndex::from_skus(skus))
}

/// 已有文件末尾缺少换行时补齐，避免追加行与最后一行粘连
fn ensure_trailing_newline(path: &Path) -> ImportResult<()> {
    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .open(path)
        .map_err(sink_error)?;

    file.seek(SeekFrom::End(-1)).map_err(sink_error)?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last).map_err(sink_error)?;
    if last[0] != b'\n' {
        file.write_all(b"\n").map_err(sink_error)?;
    }
    Ok(())
}

fn sink_error<E: std::fmt::Display>(err: E) -> ImportError {
    ImportError::SinkError(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::CATALOG_WIDTH;
    use crate::domain::types::ProductStatus;
    use tempfile::TempDir;

    fn catalog_row(sku: &str) -> CatalogRow {
        CatalogRow {
            handle: "amethyst-pendant".to_string(),
            title: "Amethyst Pendant".to_string(),
            body: String::new(),
            vendor: "Crystal Test Co".to_string(),
            product_category: "Jewelry".to_string(),
            product_type: "Pendant".to_string(),
            tags: vec!["Amethyst".to_string(), "Natural".to_string()],
            published: true,
            option1_name: "Title".to_string(),
            option1_value: "Default Title".to_string(),
            variant_sku: sku.to_string(),
            variant_grams: 0.0,
            variant_inventory_tracker: "shopify".to_string(),
            variant_inventory_qty: 3,
            variant_inventory_policy: "deny".to_string(),
            variant_fulfillment_service: "manual".to_string(),
            variant_price: 12.0,
            variant_requires_shipping: true,
            variant_taxable: true,
            gift_card: false,
            variant_weight_unit: "g".to_string(),
            cost_per_item: 5.0,
            status: ProductStatus::Active,
        }
    }

    fn read_records(path: &Path) -> Vec<StringRecord> {
        ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .unwrap()
            .records()
            .map(|r| r.unwrap())
            .collect()
    }

    #[test]
    fn test_init_writes_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("catalog.csv");

        let mut sink = CsvCatalogSink::open_or_init(&path).unwrap();
        sink.append_rows(&[catalog_row("SKU001")]).unwrap();
        sink.flush().unwrap();
        assert_eq!(sink.rows_written(), 1);

        let records = read_records(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].len(), CATALOG_WIDTH);
        assert_eq!(&records[0][2], "Body (HTML)");
        assert_eq!(&records[1][6], "Amethyst, Natural");
        assert_eq!(&records[1][17], "SKU001");
        assert_eq!(&records[1][23], "12");
    }

    #[test]
    fn test_reopen_appends_without_second_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.csv");

        {
            let mut sink = CsvCatalogSink::open_or_init(&path).unwrap();
            sink.append_rows(&[catalog_row("A")]).unwrap();
            sink.flush().unwrap();
        }
        {
            let mut sink = CsvCatalogSink::open_or_init(&path).unwrap();
            sink.append_rows(&[catalog_row("B")]).unwrap();
            sink.flush().unwrap();
        }

        let records = read_records(&path);
        assert_eq!(records.len(), 3);
        assert_eq!(&records[2][17], "B");
    }

    #[test]
    fn test_missing_trailing_newline_is_repaired() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.csv");
        std::fs::write(&path, header_row().join(",")).unwrap();

        let mut sink = CsvCatalogSink::open_or_init(&path).unwrap();
        sink.append_rows(&[catalog_row("C")]).unwrap();
        sink.flush().unwrap();

        let records = read_records(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(&records[1][17], "C");
    }

    #[test]
    fn test_load_duplicate_index() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.csv");

        assert!(load_duplicate_index(&path).unwrap().is_empty());

        let mut sink = CsvCatalogSink::open_or_init(&path).unwrap();
        sink.append_rows(&[catalog_row("SKU001"), catalog_row(" SKU002 ")])
            .unwrap();
        sink.flush().unwrap();

        let index = load_duplicate_index(&path).unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.contains("SKU002"));
        assert!(!index.contains("Variant SKU"));
    }
}
