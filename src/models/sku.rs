use serde::{Deserialize, Serialize};

use crate::models::outcome::ClassificationOutcome;

/// 输入表中的一行
///
/// `fields` 按表头顺序保存原始单元格，输出时原样带回。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuRow {
    /// 行号（从 0 开始，不含表头）
    pub index: usize,
    /// 去掉首尾空白后的 SKU
    pub sku: String,
    /// 原始单元格
    pub fields: Vec<String>,
}

impl SkuRow {
    pub fn new(index: usize, sku: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            index,
            sku: sku.into(),
            fields,
        }
    }

    /// 只有一个 SKU 列的行，主要用于测试和程序化调用
    pub fn from_sku(index: usize, sku: impl Into<String>) -> Self {
        let sku = sku.into();
        Self {
            index,
            fields: vec![sku.clone()],
            sku,
        }
    }
}

/// 完整读入内存的输入表
#[derive(Debug, Clone, Default)]
pub struct InputTable {
    pub headers: Vec<String>,
    pub rows: Vec<SkuRow>,
}

impl InputTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// 每个输入行恰好产生一条结果记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub row: SkuRow,
    pub outcome: ClassificationOutcome,
}

impl ResultRecord {
    pub fn new(row: SkuRow, outcome: ClassificationOutcome) -> Self {
        Self { row, outcome }
    }

    pub fn sku(&self) -> &str {
        &self.row.sku
    }

    pub fn error(&self) -> Option<&str> {
        self.outcome.error_message()
    }
}
