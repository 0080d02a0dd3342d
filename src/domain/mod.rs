// ==========================================
// 供应商目录导入 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含数据访问逻辑，不含规则逻辑
// ==========================================

pub mod catalog;
pub mod cursor;
pub mod product;
pub mod types;

// 重导出核心类型
pub use catalog::{header_row, CatalogColumn, CatalogRow, CATALOG_WIDTH};
pub use cursor::{
    BatchCursor, BatchPhase, BatchRunReport, ImportRun, RunState, RunStatus, FIRST_DATA_ROW,
    HEADER_ROW,
};
pub use product::{Extraction, Product, ProductSet, SkipReport};
pub use types::{CellValue, DescriptionMode, DuplicateAction, ProductStatus, Row, SkipReason};
