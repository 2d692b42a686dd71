//! SKU 处理上下文
//!
//! 封装“我正在用哪个会话处理第几行的哪个 SKU”这一信息

use std::fmt::Display;

use crate::models::SkuRow;

#[derive(Debug, Clone)]
pub struct SkuCtx {
    /// 输入行号（从 0 开始）
    pub row_index: usize,
    /// SKU
    pub sku: String,
    /// 所用会话的槽位
    pub slot: usize,
}

impl SkuCtx {
    pub fn new(row: &SkuRow, slot: usize) -> Self {
        Self {
            row_index: row.index,
            sku: row.sku.clone(),
            slot,
        }
    }
}

impl Display for SkuCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[第 {} 行 SKU {} | 会话 {}]",
            self.row_index + 1,
            self.sku,
            self.slot
        )
    }
}
