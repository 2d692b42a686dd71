//! 分类结果与分类模式

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// 单个 SKU 的分类结果，四种之一
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClassificationOutcome {
    /// 至少匹配到一个商品（仅存在性模式下不统计数量）
    Found { count: Option<usize> },
    /// 页面明确给出“无结果”提示
    NotFound,
    /// 等待时间内既没有正向标记也没有负向标记
    Indeterminate,
    /// 抓取失败或处理过程中出现异常
    Error { message: String },
}

impl ClassificationOutcome {
    pub fn error(message: impl Into<String>) -> Self {
        ClassificationOutcome::Error {
            message: message.into(),
        }
    }

    /// 商品是否存在：`None` 表示无法判断
    pub fn exists(&self) -> Option<bool> {
        match self {
            ClassificationOutcome::Found { .. } => Some(true),
            ClassificationOutcome::NotFound => Some(false),
            ClassificationOutcome::Indeterminate | ClassificationOutcome::Error { .. } => None,
        }
    }

    /// 输出中的 `Product Count` 列；出错时为空
    pub fn product_count(&self) -> Option<usize> {
        match self {
            ClassificationOutcome::Found { count } => *count,
            ClassificationOutcome::NotFound | ClassificationOutcome::Indeterminate => Some(0),
            ClassificationOutcome::Error { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ClassificationOutcome::Error { message } => Some(message),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ClassificationOutcome::Error { .. })
    }
}

impl Display for ClassificationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassificationOutcome::Found { count: Some(n) } => write!(f, "找到 {} 个商品", n),
            ClassificationOutcome::Found { count: None } => write!(f, "商品存在"),
            ClassificationOutcome::NotFound => write!(f, "无结果"),
            ClassificationOutcome::Indeterminate => write!(f, "无法判断"),
            ClassificationOutcome::Error { message } => write!(f, "错误: {}", message),
        }
    }
}

/// 分类模式
///
/// 两种模式对“超时仍无任何标记”的处理不同：四分类模式记为 `Indeterminate`，
/// 仅存在性模式记为 `NotFound`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassificationMode {
    #[default]
    FourWay,
    ExistenceOnly,
}

impl FromStr for ClassificationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "four-way" | "fourway" | "four_way" => Ok(ClassificationMode::FourWay),
            "existence-only" | "existence" | "existence_only" => {
                Ok(ClassificationMode::ExistenceOnly)
            }
            other => Err(format!(
                "未知的分类模式 '{}' (可选: four-way, existence-only)",
                other
            )),
        }
    }
}

impl Display for ClassificationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassificationMode::FourWay => write!(f, "four-way"),
            ClassificationMode::ExistenceOnly => write!(f, "existence-only"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_fields_per_outcome() {
        let found = ClassificationOutcome::Found { count: Some(2) };
        assert_eq!(found.exists(), Some(true));
        assert_eq!(found.product_count(), Some(2));

        assert_eq!(ClassificationOutcome::NotFound.exists(), Some(false));
        assert_eq!(ClassificationOutcome::NotFound.product_count(), Some(0));

        assert_eq!(ClassificationOutcome::Indeterminate.exists(), None);
        assert_eq!(ClassificationOutcome::Indeterminate.product_count(), Some(0));

        let err = ClassificationOutcome::error("connection refused");
        assert_eq!(err.exists(), None);
        assert_eq!(err.product_count(), None);
        assert_eq!(err.error_message(), Some("connection refused"));
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(
            "existence-only".parse::<ClassificationMode>().unwrap(),
            ClassificationMode::ExistenceOnly
        );
        assert_eq!(
            "Four-Way".parse::<ClassificationMode>().unwrap(),
            ClassificationMode::FourWay
        );
        assert!("both".parse::<ClassificationMode>().is_err());
    }
}
