// ==========================================
// 供应商目录导入 - 配置层
// ==========================================
// 职责: 供应商配置加载、校验、概览
// 格式: JSON 文件（camelCase 键）
// ==========================================

pub mod column_mapping;
pub mod vendor_config;

// 重导出核心配置类型
pub use column_mapping::{column_letter, ColumnIndex, ColumnMapping};
pub use vendor_config::{
    has_blocking_issues, CatalogDefaults, CategoryRule, ConfigIssue, ContentStrategy,
    DuplicateHandling, IssueLevel, PublishingRules, TagRule, TypeRule, VendorConfig,
    CHECKPOINT_DB_ENV, DEFAULT_BATCH_SIZE, DUPLICATE_FIELD_VARIANT_SKU,
};
