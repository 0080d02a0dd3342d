// ==========================================
// 供应商目录导入 - 商品领域模型
// ==========================================
// 用途: 抽取阶段产物（原始行 → Product），仅在一次抽取内有效
// 红线: Product 不允许价格 <= 0，不允许空标题 / 空 SKU
// ==========================================

use crate::domain::types::SkipReason;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// ==========================================
// Product - 已校验商品记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub sku: String,         // 规范化 SKU（已 trim，主键）
    pub title: String,       // 商品标题（已 trim）
    pub price: f64,          // 售价（> 0）
    pub cost: f64,           // 成本价（默认 0）
    pub quantity: i64,       // 库存数量
    pub weight: f64,         // 重量（默认 0）
    pub description: String, // 描述（默认空）
}

impl Product {
    /// 构造商品；违反不变量时返回 None
    pub fn new(
        sku: &str,
        title: &str,
        price: f64,
        cost: f64,
        quantity: i64,
        weight: f64,
        description: &str,
    ) -> Option<Self> {
        let sku = sku.trim();
        let title = title.trim();
        if sku.is_empty() || title.is_empty() || price.is_nan() || price <= 0.0 {
            return None;
        }

        Some(Self {
            sku: sku.to_string(),
            title: title.to_string(),
            price,
            cost,
            quantity,
            weight,
            description: description.trim().to_string(),
        })
    }
}

// ==========================================
// ProductSet - SKU → Product 映射（保持首次出现顺序）
// ==========================================
// 同一抽取内重复 SKU: 后出现的覆盖先出现的，位置不变
#[derive(Debug, Clone, Default)]
pub struct ProductSet {
    products: Vec<Product>,
    index: HashMap<String, usize>,
}

impl ProductSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入商品，返回被覆盖的旧记录
    pub fn insert(&mut self, product: Product) -> Option<Product> {
        match self.index.get(&product.sku) {
            Some(&pos) => Some(std::mem::replace(&mut self.products[pos], product)),
            None => {
                self.index.insert(product.sku.clone(), self.products.len());
                self.products.push(product);
                None
            }
        }
    }

    pub fn get(&self, sku: &str) -> Option<&Product> {
        self.index.get(sku).map(|&pos| &self.products[pos])
    }

    pub fn contains(&self, sku: &str) -> bool {
        self.index.contains_key(sku)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    pub fn into_vec(self) -> Vec<Product> {
        self.products
    }
}

// ==========================================
// SkipReport - 跳过行统计（观测用途，不影响正确性）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipReport {
    pub by_reason: BTreeMap<SkipReason, usize>, // 按原因计数
    pub unparseable_numeric: usize,             // 数值解析失败（已按 0 处理）
    pub overwritten: usize,                     // 同批次 SKU 覆盖次数
}

impl SkipReport {
    pub fn record(&mut self, reason: SkipReason) {
        *self.by_reason.entry(reason).or_insert(0) += 1;
    }

    pub fn count(&self, reason: SkipReason) -> usize {
        self.by_reason.get(&reason).copied().unwrap_or(0)
    }

    /// 跳过的总行数
    pub fn total(&self) -> usize {
        self.by_reason.values().sum()
    }

    /// 合并另一批次的统计
    pub fn merge(&mut self, other: &SkipReport) {
        for (reason, count) in &other.by_reason {
            *self.by_reason.entry(*reason).or_insert(0) += count;
        }
        self.unparseable_numeric += other.unparseable_numeric;
        self.overwritten += other.overwritten;
    }
}

// ==========================================
// Extraction - 一次抽取的结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub products: ProductSet,
    pub skipped: SkipReport,
}
