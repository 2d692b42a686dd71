//! SKU 处理流程 - 流程层
//!
//! 核心职责：定义“一个 SKU”的完整处理流程
//!
//! 流程顺序：
//! 1. 用会话搜索 SKU（导航 + 等待标记）
//! 2. 按优先级规则分类

use tracing::debug;

use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::Session;
use crate::models::ClassificationOutcome;
use crate::services::{Classifier, SearchService};
use crate::workflow::sku_ctx::SkuCtx;

/// SKU 处理流程
///
/// - 不持有任何会话
/// - 只依赖业务能力（services）
pub struct SkuFlow {
    search: SearchService,
    classifier: Classifier,
}

impl SkuFlow {
    pub fn new(search: SearchService, classifier: Classifier) -> Self {
        Self { search, classifier }
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        let search = SearchService::new(
            config.search_url.clone(),
            config.markers()?,
            config.mode,
            config.wait_timeout(),
            config.poll_interval(),
        );
        let classifier = Classifier::new(config.mode, config.no_results_phrase.clone());
        Ok(Self::new(search, classifier))
    }

    pub async fn run<S: Session + ?Sized>(
        &self,
        session: &mut S,
        ctx: &SkuCtx,
    ) -> ClassificationOutcome {
        if ctx.sku.is_empty() {
            return ClassificationOutcome::error("SKU 为空");
        }

        debug!("{} 🔍 开始搜索", ctx);
        let fetched = self.search.fetch(session, &ctx.sku).await;
        self.classifier.classify(&ctx.sku, &fetched)
    }
}
