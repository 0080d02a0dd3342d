// ==========================================
// 供应商目录导入 - 导入层
// ==========================================
// 职责: 供应商原始行 → 目录行，按窗口批量写入
// 支持: CSV, Excel, 内存表
// ==========================================

// 模块声明
pub mod batch_coordinator;
pub mod catalog_row_builder;
pub mod catalog_writer;
pub mod conflict_handler;
pub mod data_cleaner;
pub mod error;
pub mod file_parser;
pub mod importer_trait;
pub mod memory;
pub mod product_extractor;

// 重导出核心类型
pub use batch_coordinator::BatchCoordinator;
pub use catalog_row_builder::{generate_handle, CatalogRowBuilder};
pub use catalog_writer::{load_duplicate_index, CsvCatalogSink};
pub use conflict_handler::DuplicateIndex;
pub use data_cleaner::{DataCleaner, NumericCell};
pub use error::{ImportError, ImportResult};
pub use file_parser::{open_source, CsvSource, ExcelSource};
pub use memory::{InMemorySink, InMemorySource};
pub use product_extractor::ProductExtractor;

// 重导出 Trait 接口
pub use importer_trait::{CatalogSink, SourceRangeReader};
