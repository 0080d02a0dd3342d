// ==========================================
// 供应商目录导入 - 列读取器
// ==========================================
// 职责: 按列下标安全读取单元格
// 规则: 下标未设置 / 越界 / 假值单元格 → 空
// 红线: 永不失败，不抛错
// ==========================================

use crate::config::ColumnIndex;
use crate::domain::types::CellValue;

static EMPTY: CellValue = CellValue::Empty;

/// 读取单元格（假值统一为 Empty）
pub fn value(row: &[CellValue], column: ColumnIndex) -> &CellValue {
    match column.get().and_then(|i| row.get(i)) {
        Some(cell) if !cell.is_falsy() => cell,
        _ => &EMPTY,
    }
}

/// 读取单元格文本（不做修剪）
pub fn text(row: &[CellValue], column: ColumnIndex) -> String {
    value(row, column).as_text()
}
