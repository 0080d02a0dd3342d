// ==========================================
// 供应商目录导入 - 数据清洗器
// ==========================================
// 职责: 单元格 → 文本 / 小数 / 整数
// 规则:
// - 文本: TRIM
// - 小数: 取前缀数字（"12.50 GBP" → 12.5），无数字前缀 → 无法解析
// - 整数: 同一前缀取整数部分（"3.7" → 3）
// 红线: 不抛错；无法解析由调用方按默认值处理并计数
// ==========================================

use crate::domain::types::CellValue;

// ==========================================
// NumericCell - 数值单元格解析结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericCell<T> {
    Missing,     // 空单元格
    Parsed(T),   // 解析成功
    Unparseable, // 有内容但无法解析
}

impl<T: Copy> NumericCell<T> {
    /// 取值；空或无法解析时返回 default
    pub fn value_or(self, default: T) -> T {
        match self {
            NumericCell::Parsed(v) => v,
            NumericCell::Missing | NumericCell::Unparseable => default,
        }
    }

    pub fn is_unparseable(&self) -> bool {
        matches!(self, NumericCell::Unparseable)
    }
}

pub struct DataCleaner;

impl DataCleaner {
    /// 文本清洗（TRIM）
    pub fn clean_text(&self, value: &CellValue) -> String {
        value.as_text().trim().to_string()
    }

    /// 解析小数
    pub fn parse_decimal(&self, value: &CellValue) -> NumericCell<f64> {
        match value {
            CellValue::Empty => NumericCell::Missing,
            CellValue::Number(n) if n.is_finite() => NumericCell::Parsed(*n),
            CellValue::Number(_) | CellValue::Bool(_) => NumericCell::Unparseable,
            CellValue::Text(s) => match decimal_prefix(s) {
                Some(n) => NumericCell::Parsed(n),
                None if s.trim().is_empty() => NumericCell::Missing,
                None => NumericCell::Unparseable,
            },
        }
    }

    /// 解析整数（截断小数部分）
    pub fn parse_integer(&self, value: &CellValue) -> NumericCell<i64> {
        match self.parse_decimal(value) {
            NumericCell::Parsed(n) => {
                let truncated = n.trunc();
                if truncated >= i64::MIN as f64 && truncated <= i64::MAX as f64 {
                    NumericCell::Parsed(truncated as i64)
                } else {
                    NumericCell::Unparseable
                }
            }
            NumericCell::Missing => NumericCell::Missing,
            NumericCell::Unparseable => NumericCell::Unparseable,
        }
    }
}

/// 取字符串前缀中的小数: [空白][符号]数字[.数字][e[符号]数字]
fn decimal_prefix(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }

    if digits == 0 {
        return None;
    }

    // 指数部分必须带数字才计入
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}
