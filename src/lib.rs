// ==========================================
// 供应商目录导入 - 核心库
// ==========================================
// 流程: 供应商商品表 → 规则分类 → 电商目录行（批量追加，可续传）
// 技术栈: Rust + CSV/Excel + SQLite（检查点）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 配置层 - 供应商配置
pub mod config;

// 引擎层 - 列访问与关键字规则
pub mod engine;

// 导入层 - 抽取 / 构造 / 批次协调
pub mod importer;

// 数据仓储层 - 检查点与运行记录
pub mod repository;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 用例接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    BatchCursor, CatalogRow, CellValue, DescriptionMode, DuplicateAction, Product, ProductStatus,
    RunState, SkipReason,
};

// 配置
pub use config::{ColumnIndex, ColumnMapping, VendorConfig};

// 引擎
pub use engine::{MatchStrategy, RuleEngine};

// 导入
pub use importer::{BatchCoordinator, CatalogRowBuilder, ImportError, ImportResult, ProductExtractor};

// API
pub use api::{ImportApi, ImportMode, ImportSummary};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "供应商目录导入";
