//! 分类服务 - 业务能力层
//!
//! 纯函数：抓取结果 + SKU → 分类结果

use tracing::debug;

use crate::models::{ClassificationMode, ClassificationOutcome, PageSnapshot};
use crate::services::search_service::FetchResult;

/// 按优先级规则判断 SKU 是否存在
///
/// 四分类模式（先命中者生效）：
/// 1. 抓取失败 → `Error`
/// 2. 正向容器内有商品 → `Found { count }`
/// 3. 负向容器文本包含无结果短语 → `NotFound`
/// 4. 其他 → `Indeterminate`
///
/// 页面局部渲染时可能同时出现空的正向容器和负向提示，
/// 所以先看“有没有商品”，再看“无结果”提示。
///
/// 仅存在性模式：正向容器或备用标记存在即 `Found`（不计数），其他情况都视为 `NotFound`。
#[derive(Debug, Clone)]
pub struct Classifier {
    mode: ClassificationMode,
    no_results_phrase: String,
}

impl Classifier {
    pub fn new(mode: ClassificationMode, no_results_phrase: impl Into<String>) -> Self {
        Self {
            mode,
            no_results_phrase: no_results_phrase.into(),
        }
    }

    pub fn classify(&self, sku: &str, fetched: &FetchResult) -> ClassificationOutcome {
        let snapshot = match fetched {
            Ok(snapshot) => snapshot,
            Err(e) => return ClassificationOutcome::error(e.to_string()),
        };

        let outcome = match self.mode {
            ClassificationMode::FourWay => self.classify_four_way(snapshot),
            ClassificationMode::ExistenceOnly => self.classify_existence(snapshot),
        };
        debug!("SKU {} 分类结果: {}", sku, outcome);
        outcome
    }

    fn classify_four_way(&self, snapshot: &PageSnapshot) -> ClassificationOutcome {
        if let Some(container) = snapshot.results {
            if container.item_count > 0 {
                return ClassificationOutcome::Found {
                    count: Some(container.item_count),
                };
            }
        }

        if self.has_no_results_text(snapshot) {
            return ClassificationOutcome::NotFound;
        }

        ClassificationOutcome::Indeterminate
    }

    fn classify_existence(&self, snapshot: &PageSnapshot) -> ClassificationOutcome {
        if snapshot.results.is_some() || snapshot.has_title {
            return ClassificationOutcome::Found { count: None };
        }

        // 负向提示和超时都视为不存在
        ClassificationOutcome::NotFound
    }

    fn has_no_results_text(&self, snapshot: &PageSnapshot) -> bool {
        snapshot
            .no_results_text
            .as_deref()
            .is_some_and(|text| text.contains(&self.no_results_phrase))
    }
}
