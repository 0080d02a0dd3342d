// ==========================================
// 供应商目录导入 - 领域类型定义
// ==========================================
// 职责: 单元格值、行、内容策略、去重动作、商品状态、跳过原因
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// CellValue - 单元格值
// ==========================================
// 外部数据源（CSV / Excel）读出的原始值，不做业务解释
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// 是否为"假值"单元格（空串 / 0 / NaN / false / 空）
    ///
    /// 假值在读取时统一视为空字符串
    pub fn is_falsy(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Bool(b) => !b,
            CellValue::Number(n) => *n == 0.0 || n.is_nan(),
            CellValue::Text(s) => s.is_empty(),
        }
    }

    /// 转为文本（数值为整数时不带小数部分）
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Bool(true) => "TRUE".to_string(),
            CellValue::Bool(false) => "FALSE".to_string(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value.to_string())
        }
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value)
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

/// 数值格式化: 整数不带小数，其余保留最短表示
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// 一行原始数据（按列顺序）
pub type Row = Vec<CellValue>;

// ==========================================
// DescriptionMode - 描述内容策略
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptionMode {
    #[default]
    Empty, // 始终为空
    Static, // 固定配置内容
    Source, // 取商品自身描述
    #[serde(other)]
    Unknown, // 未知取值 → 空
}

impl fmt::Display for DescriptionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptionMode::Empty => write!(f, "empty"),
            DescriptionMode::Static => write!(f, "static"),
            DescriptionMode::Source => write!(f, "source"),
            DescriptionMode::Unknown => write!(f, "unknown"),
        }
    }
}

// ==========================================
// DuplicateAction - 重复 SKU 处理动作
// ==========================================
// Replace 只影响外部写入端，抽取阶段不跳过
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateAction {
    #[default]
    Skip,
    Replace,
}

impl fmt::Display for DuplicateAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicateAction::Skip => write!(f, "skip"),
            DuplicateAction::Replace => write!(f, "replace"),
        }
    }
}

// ==========================================
// ProductStatus - 商品状态（由发布状态派生）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Active,
    Draft,
}

impl ProductStatus {
    pub fn from_published(published: bool) -> Self {
        if published {
            ProductStatus::Active
        } else {
            ProductStatus::Draft
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductStatus::Active => write!(f, "active"),
            ProductStatus::Draft => write!(f, "draft"),
        }
    }
}

// ==========================================
// SkipReason - 行被跳过的原因（InvalidRow，非致命）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipReason {
    MissingTitle,     // 标题为空
    MissingSku,       // SKU 为空
    HeaderEcho,       // 区间中出现的表头行
    DuplicateSku,     // 目标中已存在该 SKU
    NonPositivePrice, // 价格 <= 0 或无法解析
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingTitle => write!(f, "MISSING_TITLE"),
            SkipReason::MissingSku => write!(f, "MISSING_SKU"),
            SkipReason::HeaderEcho => write!(f, "HEADER_ECHO"),
            SkipReason::DuplicateSku => write!(f, "DUPLICATE_SKU"),
            SkipReason::NonPositivePrice => write!(f, "NON_POSITIVE_PRICE"),
        }
    }
}
