// ==========================================
// 供应商目录导入 - API 层
// ==========================================
// 职责: 提供用例级接口,供 CLI 及嵌入方调用
// ==========================================

pub mod import_api;

// 重导出核心类型
pub use import_api::{ConfigCheckReport, ImportApi, ImportMode, ImportOutcome, ImportSummary};
