// ==========================================
// 供应商目录导入 - 列映射
// ==========================================
// 职责: 逻辑字段 → 源表列下标（0 起始）
// 约定: 配置中 -1（或任意负数）表示该字段未提供
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ==========================================
// ColumnIndex - 列下标（可未设置）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct ColumnIndex(Option<usize>);

impl ColumnIndex {
    /// 未设置（哨兵 -1）
    pub const UNSET: ColumnIndex = ColumnIndex(None);

    pub fn at(index: usize) -> Self {
        ColumnIndex(Some(index))
    }

    pub fn get(self) -> Option<usize> {
        self.0
    }

    pub fn is_set(self) -> bool {
        self.0.is_some()
    }
}

impl From<i64> for ColumnIndex {
    fn from(raw: i64) -> Self {
        if raw < 0 {
            ColumnIndex::UNSET
        } else {
            ColumnIndex(usize::try_from(raw).ok())
        }
    }
}

impl From<ColumnIndex> for i64 {
    fn from(index: ColumnIndex) -> Self {
        index
            .0
            .and_then(|i| i64::try_from(i).ok())
            .unwrap_or(-1)
    }
}

impl fmt::Display for ColumnIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", column_letter(*self))
    }
}

/// 列下标 → 表格列字母（A, B, ..., Z, AA, AB, ...）
pub fn column_letter(index: ColumnIndex) -> String {
    let Some(mut n) = index.get() else {
        return "Not Set".to_string();
    };

    let mut letters = Vec::new();
    loop {
        letters.push(char::from(b'A' + (n % 26) as u8));
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters.iter().rev().collect()
}

// ==========================================
// ColumnMapping - 列映射配置
// ==========================================
// 别名: wholesale → cost, retail → price
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColumnMapping {
    pub title: ColumnIndex,
    pub sku: ColumnIndex,
    pub description: ColumnIndex,
    #[serde(alias = "wholesale")]
    pub cost: ColumnIndex,
    #[serde(alias = "retail")]
    pub price: ColumnIndex,
    pub quantity: ColumnIndex,
    pub weight: ColumnIndex,
    pub barcode: ColumnIndex,
    pub compare_price: ColumnIndex,
}

impl ColumnMapping {
    /// 所有字段绑定（逻辑字段名, 列下标）
    pub fn bindings(&self) -> [(&'static str, ColumnIndex); 9] {
        [
            ("title", self.title),
            ("sku", self.sku),
            ("description", self.description),
            ("cost", self.cost),
            ("price", self.price),
            ("quantity", self.quantity),
            ("weight", self.weight),
            ("barcode", self.barcode),
            ("comparePrice", self.compare_price),
        ]
    }

    /// 绑定到同一列的多个字段（列下标, 字段名列表）
    pub fn shared_columns(&self) -> Vec<(usize, Vec<&'static str>)> {
        let mut by_column: HashMap<usize, Vec<&'static str>> = HashMap::new();
        for (field, index) in self.bindings() {
            if let Some(i) = index.get() {
                by_column.entry(i).or_default().push(field);
            }
        }

        let mut shared: Vec<_> = by_column
            .into_iter()
            .filter(|(_, fields)| fields.len() > 1)
            .collect();
        shared.sort_by_key(|(column, _)| *column);
        shared
    }
}
