// ==========================================
// 供应商目录导入 - 供应商配置
// ==========================================
// 职责: 一次运行的全部配置（不可变值，显式传入各组件）
// 格式: JSON，键名 camelCase，与供应商模板一致
// 红线: 组件不读取任何全局可变配置
// ==========================================

use crate::config::column_mapping::{column_letter, ColumnMapping};
use crate::domain::types::{DescriptionMode, DuplicateAction};
use crate::importer::error::{ImportError, ImportResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// 默认窗口大小
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// 目前唯一支持的去重字段
pub const DUPLICATE_FIELD_VARIANT_SKU: &str = "variantSku";

/// 检查点数据库路径环境变量
pub const CHECKPOINT_DB_ENV: &str = "VENDOR_CATALOG_IMPORT_DB_PATH";

// ==========================================
// 规则配置
// ==========================================

/// 分类规则（按 priority 降序，同优先级按声明顺序）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub keywords: Vec<String>,
    pub category: String,
    #[serde(default)]
    pub priority: i32,
}

/// 类型规则（按声明顺序，首个命中生效）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeRule {
    pub keywords: Vec<String>,
    #[serde(rename = "type")]
    pub product_type: String,
}

/// 标签规则（全部命中累加）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagRule {
    pub keywords: Vec<String>,
    pub tags: Vec<String>,
}

/// 发布规则: 标题含任一排除词 → 不发布
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PublishingRules {
    pub exclude_keywords: Vec<String>,
}

// ==========================================
// ContentStrategy - 描述生成策略
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContentStrategy {
    pub description: DescriptionMode,
    pub static_content: String,
    pub html_wrap: bool,
}

// ==========================================
// DuplicateHandling - 重复导入防护
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DuplicateHandling {
    pub enabled: bool,
    pub field: String,
    pub action: DuplicateAction,
}

impl Default for DuplicateHandling {
    fn default() -> Self {
        Self {
            enabled: true,
            field: DUPLICATE_FIELD_VARIANT_SKU.to_string(),
            action: DuplicateAction::Skip,
        }
    }
}

impl DuplicateHandling {
    /// 抽取阶段是否按重复 SKU 跳过
    pub fn skips_existing(&self) -> bool {
        self.enabled && self.action == DuplicateAction::Skip
    }
}

// ==========================================
// CatalogDefaults - 目录字段默认值
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogDefaults {
    pub category: String,
    #[serde(rename = "type")]
    pub product_type: String,
    pub tags: Vec<String>, // 所有商品的基础标签
    pub published: bool,
    pub requires_shipping: bool,
    pub taxable: bool,
    pub inventory_policy: String,
    pub fulfillment_service: String,
    pub inventory_tracker: String,
    pub weight_unit: String, // g / kg / lb / oz
}

impl Default for CatalogDefaults {
    fn default() -> Self {
        Self {
            category: "Arts & Entertainment > Hobbies & Creative Arts > Arts & Crafts".to_string(),
            product_type: "Product".to_string(),
            tags: vec![
                "Spiritual".to_string(),
                "Natural".to_string(),
                "Handmade".to_string(),
            ],
            published: true,
            requires_shipping: true,
            taxable: true,
            inventory_policy: "deny".to_string(),
            fulfillment_service: "manual".to_string(),
            inventory_tracker: "shopify".to_string(),
            weight_unit: "g".to_string(),
        }
    }
}

// ==========================================
// VendorConfig - 供应商配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VendorConfig {
    // ===== 基础 =====
    #[serde(alias = "vendorName")]
    pub vendor: String,
    #[serde(alias = "sourceSheetName")]
    pub source_sheet: String,
    pub source_worksheet: Option<String>,
    #[serde(alias = "targetSheetName")]
    pub target_sheet: String,
    pub checkpoint_db: Option<String>,

    // ===== 批处理 =====
    pub batch_size: usize,
    pub debug_mode: bool,
    pub resume_on_error: bool,

    // ===== 映射与内容 =====
    #[serde(alias = "columnMapping")]
    pub column_mappings: ColumnMapping,
    pub content_strategy: ContentStrategy,

    // ===== 业务规则 =====
    pub category_rules: Vec<CategoryRule>,
    pub type_rules: Vec<TypeRule>,
    pub tag_rules: Vec<TagRule>,
    pub publishing_rules: PublishingRules,

    // ===== 去重与默认值 =====
    pub duplicate_handling: DuplicateHandling,
    pub defaults: CatalogDefaults,
    pub default_quantity_when_missing: i64,
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            vendor: "Your Vendor Name".to_string(),
            source_sheet: "VendorOrder.csv".to_string(),
            source_worksheet: None,
            target_sheet: "catalog_products.csv".to_string(),
            checkpoint_db: None,
            batch_size: DEFAULT_BATCH_SIZE,
            debug_mode: false,
            resume_on_error: true,
            column_mappings: ColumnMapping::default(),
            content_strategy: ContentStrategy::default(),
            category_rules: Vec::new(),
            type_rules: Vec::new(),
            tag_rules: Vec::new(),
            publishing_rules: PublishingRules::default(),
            duplicate_handling: DuplicateHandling::default(),
            defaults: CatalogDefaults::default(),
            default_quantity_when_missing: 0,
        }
    }
}

// ==========================================
// ConfigIssue - 配置校验问题
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueLevel {
    Error,   // 阻断运行
    Warning, // 允许运行
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigIssue {
    pub level: IssueLevel,
    pub field: String,
    pub message: String,
}

impl ConfigIssue {
    fn error(field: &str, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Error,
            field: field.to_string(),
            message: message.into(),
        }
    }

    fn warning(field: &str, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Warning,
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            IssueLevel::Error => "ERROR",
            IssueLevel::Warning => "WARN",
        };
        write!(f, "[{}] {}: {}", level, self.field, self.message)
    }
}

impl VendorConfig {
    /// 从 JSON 文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ImportError::ConfigReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        serde_json::from_str(&raw).map_err(|e| ImportError::ConfigReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// 从 JSON 字符串加载配置
    pub fn from_json_str(raw: &str) -> ImportResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// 检查点键: 同一供应商 + 源 + 目标 共享一个游标
    pub fn run_key(&self) -> String {
        format!(
            "{}::{}->{}",
            self.vendor.trim(),
            self.source_sheet.trim(),
            self.target_sheet.trim()
        )
    }

    /// 检查点数据库路径
    ///
    /// 优先级: checkpointDb > 环境变量 > 用户数据目录 > 当前目录
    pub fn checkpoint_db_path(&self) -> PathBuf {
        if let Some(path) = self.checkpoint_db.as_deref().map(str::trim) {
            if !path.is_empty() {
                return PathBuf::from(path);
            }
        }

        if let Ok(path) = std::env::var(CHECKPOINT_DB_ENV) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }

        match dirs::data_dir() {
            Some(data_dir) => data_dir
                .join("vendor-catalog-import")
                .join("checkpoints.db"),
            None => PathBuf::from("./vendor_catalog_checkpoints.db"),
        }
    }

    /// 配置校验
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.vendor.trim().is_empty() {
            issues.push(ConfigIssue::error("vendor", "供应商名称为空"));
        }
        if self.source_sheet.trim().is_empty() {
            issues.push(ConfigIssue::error("sourceSheet", "源表未配置"));
        }
        if self.target_sheet.trim().is_empty() {
            issues.push(ConfigIssue::error("targetSheet", "目标表未配置"));
        }
        if self.batch_size == 0 {
            issues.push(ConfigIssue::error("batchSize", "窗口大小必须大于 0"));
        }

        // 必需列
        let mapping = &self.column_mappings;
        for (field, index) in [
            ("columnMappings.title", mapping.title),
            ("columnMappings.sku", mapping.sku),
            ("columnMappings.price", mapping.price),
        ] {
            if !index.is_set() {
                issues.push(ConfigIssue::error(field, "必需字段未映射（-1）"));
            }
        }
        for (column, fields) in mapping.shared_columns() {
            issues.push(ConfigIssue::warning(
                "columnMappings",
                format!(
                    "列 {} 同时绑定了多个字段: {}",
                    column_letter(crate::config::ColumnIndex::at(column)),
                    fields.join(", ")
                ),
            ));
        }

        // 内容策略
        match self.content_strategy.description {
            DescriptionMode::Static if self.content_strategy.static_content.trim().is_empty() => {
                issues.push(ConfigIssue::warning(
                    "contentStrategy.staticContent",
                    "static 策略下固定内容为空",
                ));
            }
            DescriptionMode::Source if !mapping.description.is_set() => {
                issues.push(ConfigIssue::warning(
                    "contentStrategy.description",
                    "source 策略但 description 列未映射，描述将为空",
                ));
            }
            DescriptionMode::Unknown => {
                issues.push(ConfigIssue::warning(
                    "contentStrategy.description",
                    "未知的描述策略，描述将为空",
                ));
            }
            _ => {}
        }

        // 规则关键词
        for (i, rule) in self.category_rules.iter().enumerate() {
            if !has_keyword(&rule.keywords) {
                issues.push(ConfigIssue::warning(
                    &format!("categoryRules[{}]", i),
                    "规则没有有效关键词，永远不会命中",
                ));
            }
        }
        for (i, rule) in self.type_rules.iter().enumerate() {
            if !has_keyword(&rule.keywords) {
                issues.push(ConfigIssue::warning(
                    &format!("typeRules[{}]", i),
                    "规则没有有效关键词，永远不会命中",
                ));
            }
        }
        for (i, rule) in self.tag_rules.iter().enumerate() {
            if !has_keyword(&rule.keywords) {
                issues.push(ConfigIssue::warning(
                    &format!("tagRules[{}]", i),
                    "规则没有有效关键词，永远不会命中",
                ));
            }
        }

        // 去重
        if self.duplicate_handling.enabled
            && self.duplicate_handling.field != DUPLICATE_FIELD_VARIANT_SKU
        {
            issues.push(ConfigIssue::error(
                "duplicateHandling.field",
                format!(
                    "不支持的去重字段: {}（仅支持 {}）",
                    self.duplicate_handling.field, DUPLICATE_FIELD_VARIANT_SKU
                ),
            ));
        }

        if self.default_quantity_when_missing < 0 {
            issues.push(ConfigIssue::error(
                "defaultQuantityWhenMissing",
                "缺省库存数量不能为负数",
            ));
        }

        issues
    }

    /// 配置概览（供 CLI 展示）
    pub fn summary(&self) -> String {
        let mapping = &self.column_mappings;
        let mut lines = vec![
            "当前配置:".to_string(),
            format!("  供应商: {}", self.vendor),
            format!("  源表: {}", self.source_sheet),
            format!("  目标表: {}", self.target_sheet),
            format!("  窗口大小: {}", self.batch_size),
            format!(
                "  断点续传: {}",
                if self.resume_on_error { "开启" } else { "关闭" }
            ),
            String::new(),
            "列映射:".to_string(),
        ];

        for (field, index) in mapping.bindings() {
            lines.push(format!("  • {}: 列 {}", field, column_letter(index)));
        }

        lines.push(String::new());
        lines.push(format!(
            "规则: 分类 {} 条 / 类型 {} 条 / 标签 {} 条 / 排除词 {} 个",
            self.category_rules.len(),
            self.type_rules.len(),
            self.tag_rules.len(),
            self.publishing_rules.exclude_keywords.len()
        ));
        lines.push(format!(
            "描述策略: {}{}",
            self.content_strategy.description,
            if self.content_strategy.html_wrap {
                "（<p> 包裹）"
            } else {
                ""
            }
        ));
        lines.push(format!(
            "去重: {}（{} / {}）",
            if self.duplicate_handling.enabled { "开启" } else { "关闭" },
            self.duplicate_handling.field,
            self.duplicate_handling.action
        ));

        lines.join("\n")
    }
}

/// 是否存在非空白关键词
fn has_keyword(keywords: &[String]) -> bool {
    keywords.iter().any(|k| !k.trim().is_empty())
}

/// 是否存在阻断级问题
pub fn has_blocking_issues(issues: &[ConfigIssue]) -> bool {
    issues.iter().any(|i| i.level == IssueLevel::Error)
}
