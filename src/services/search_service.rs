//! 搜索服务 - 业务能力层
//!
//! 只负责“用一个会话搜索一个 SKU 并拿到渲染后的页面”，不做分类

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::infrastructure::Session;
use crate::models::{ClassificationMode, Marker, MarkerSet, PageSnapshot};

/// 抓取结果：页面快照或传输错误
pub type FetchResult = Result<PageSnapshot, FetchError>;

/// 查询参数中保留原样的字符：字母数字以及 `_ . - ~ /`
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/');

/// 搜索服务
///
/// 职责：
/// - 拼接搜索地址
/// - 导航并等待正向或负向标记出现（有上限）
/// - 把最终页面转换为 [`PageSnapshot`]
pub struct SearchService {
    search_url: String,
    markers: MarkerSet,
    mode: ClassificationMode,
    wait_timeout: Duration,
    poll_interval: Duration,
}

impl SearchService {
    pub fn new(
        search_url: impl Into<String>,
        markers: MarkerSet,
        mode: ClassificationMode,
        wait_timeout: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            search_url: search_url.into(),
            markers,
            mode,
            wait_timeout,
            poll_interval,
        }
    }

    /// 生成某个 SKU 的搜索地址
    pub fn search_url(&self, sku: &str) -> String {
        let separator = if self.search_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}q={}",
            self.search_url,
            separator,
            utf8_percent_encode(sku, QUERY_VALUE)
        )
    }

    /// 需要等待的标记；仅存在性模式额外等待备用标记
    fn awaited_markers(&self) -> Vec<&Marker> {
        let mut markers = vec![&self.markers.results, &self.markers.no_results];
        if self.mode == ClassificationMode::ExistenceOnly {
            markers.push(&self.markers.title);
        }
        markers
    }

    /// 用给定会话搜索 SKU
    ///
    /// 超时仍未出现任何标记不算错误，返回的快照中不含这些标记即可。
    /// 调用期间会话的当前页面会被改变，同一会话不能并发调用。
    pub async fn fetch<S: Session + ?Sized>(&self, session: &mut S, sku: &str) -> FetchResult {
        let url = self.search_url(sku);
        session.navigate(&url).await?;

        let appeared = self.wait_for_markers(session).await;
        if !appeared {
            warn!(
                "SKU {} 在 {} 秒内没有出现任何结果标记",
                sku,
                self.wait_timeout.as_secs()
            );
        }

        let html = session.html().await?;
        Ok(PageSnapshot::from_html(url, &html, &self.markers))
    }

    /// 轮询直到任一标记出现或超时
    async fn wait_for_markers<S: Session + ?Sized>(&self, session: &mut S) -> bool {
        let markers = self.awaited_markers();
        let deadline = Instant::now() + self.wait_timeout;
        let mut polls = 0usize;

        loop {
            polls += 1;
            match session.has_any(&markers).await {
                Ok(true) => {
                    debug!("第 {} 次检查时出现结果标记", polls);
                    return true;
                }
                Ok(false) => {}
                // 页面仍在加载时检查可能失败，视为标记尚未出现
                Err(e) => debug!("第 {} 次检查标记失败: {}", polls, e),
            }
            if !session.is_live() {
                return false;
            }

            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            sleep(self.poll_interval.min(deadline - now)).await;
        }
    }
}
