// ==========================================
// 供应商目录导入 - 目录行构造器
// ==========================================
// 职责: Product + 运行配置 → CatalogRow（39 列定宽）
// 规则:
// - Handle 由标题派生，幂等
// - 描述按内容策略（empty / static / source）生成
// - 分类 / 类型 / 标签 / 发布状态委托 RuleEngine
// - 其余字段取自运行配置与商品数值字段
// 红线: 不产生半成品行，只从有效 Product 一次性构造
// ==========================================

use crate::config::VendorConfig;
use crate::domain::catalog::CatalogRow;
use crate::domain::product::{Product, ProductSet};
use crate::domain::types::{DescriptionMode, ProductStatus};
use crate::engine::RuleEngine;

/// Option1 固定取值（单变体商品）
pub const OPTION1_NAME: &str = "Title";
pub const OPTION1_VALUE: &str = "Default Title";

/// 由标题生成 Handle
///
/// 小写 → 去除 [a-z0-9 空白 -] 以外的字符 → 空白串转连字符
/// → 合并连续连字符 → 去除首尾连字符
pub fn generate_handle(title: &str) -> String {
    let mut handle = String::with_capacity(title.len());

    for c in title.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            handle.push(c);
        } else if (c.is_whitespace() || c == '-') && !handle.is_empty() && !handle.ends_with('-')
        {
            handle.push('-');
        }
    }

    while handle.ends_with('-') {
        handle.pop();
    }
    handle
}

// ==========================================
// CatalogRowBuilder
// ==========================================
pub struct CatalogRowBuilder<'a> {
    config: &'a VendorConfig,
    rules: RuleEngine,
}

impl<'a> CatalogRowBuilder<'a> {
    pub fn new(config: &'a VendorConfig) -> Self {
        Self {
            config,
            rules: RuleEngine::from_config(config),
        }
    }

    /// 按内容策略生成描述
    pub fn description(&self, product: &Product) -> String {
        let strategy = &self.config.content_strategy;
        let content = match strategy.description {
            DescriptionMode::Static => strategy.static_content.as_str(),
            DescriptionMode::Source => product.description.as_str(),
            DescriptionMode::Empty | DescriptionMode::Unknown => return String::new(),
        };

        if strategy.html_wrap {
            format!("<p>{}</p>", content)
        } else {
            content.to_string()
        }
    }

    /// 构造单个目录行
    pub fn build(&self, product: &Product) -> CatalogRow {
        let defaults = &self.config.defaults;
        let published = self.rules.published(&product.title);

        CatalogRow {
            handle: generate_handle(&product.title),
            title: product.title.clone(),
            body: self.description(product),
            vendor: self.config.vendor.clone(),
            product_category: self.rules.category(&product.title),
            product_type: self.rules.product_type(&product.title),
            tags: self.rules.tags(&product.title),
            published,
            option1_name: OPTION1_NAME.to_string(),
            option1_value: OPTION1_VALUE.to_string(),
            variant_sku: product.sku.clone(),
            variant_grams: product.weight,
            variant_inventory_tracker: defaults.inventory_tracker.clone(),
            variant_inventory_qty: product.quantity,
            variant_inventory_policy: defaults.inventory_policy.clone(),
            variant_fulfillment_service: defaults.fulfillment_service.clone(),
            variant_price: product.price,
            variant_requires_shipping: defaults.requires_shipping,
            variant_taxable: defaults.taxable,
            gift_card: false,
            variant_weight_unit: defaults.weight_unit.clone(),
            cost_per_item: product.cost,
            status: ProductStatus::from_published(published),
        }
    }

    /// 按抽取顺序构造全部目录行
    pub fn build_all(&self, products: &ProductSet) -> Vec<CatalogRow> {
        products.iter().map(|p| self.build(p)).collect()
    }
}
