//! 渲染后页面的快照
//!
//! 抓取结束时把页面 HTML 解析一次，只保留分类需要的事实，
//! 之后的分类逻辑不再接触 DOM。

use scraper::{Html, Selector};
use serde::Serialize;

use crate::error::ConfigError;

/// 一个带原始 CSS 文本的已编译选择器
///
/// 浏览器会话用 CSS 文本在页面里查询，HTTP 会话和快照解析用编译后的选择器。
#[derive(Debug, Clone)]
pub struct Marker {
    css: String,
    selector: Selector,
}

impl Marker {
    pub fn parse(css: &str) -> Result<Self, ConfigError> {
        let selector = Selector::parse(css).map_err(|e| ConfigError::InvalidSelector {
            selector: css.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            css: css.to_string(),
            selector,
        })
    }

    pub fn css(&self) -> &str {
        &self.css
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// 在 HTML 文档中是否存在匹配元素
    pub fn is_present(&self, document: &Html) -> bool {
        document.select(&self.selector).next().is_some()
    }
}

/// 结果页上用于判断存在性的全部标记
#[derive(Debug, Clone)]
pub struct MarkerSet {
    /// 正向结果容器，例如 `#amasty-shopby-product-list`
    pub results: Marker,
    /// 结果容器内的商品元素，例如 `.product-item`
    pub item: Marker,
    /// 负向结果容器，例如 `.nxt-nrf-container`
    pub no_results: Marker,
    /// 仅存在性模式使用的备用结构标记，例如 `.page-title-wrapper`
    pub title: Marker,
}

impl MarkerSet {
    pub fn new(results: &str, item: &str, no_results: &str, title: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            results: Marker::parse(results)?,
            item: Marker::parse(item)?,
            no_results: Marker::parse(no_results)?,
            title: Marker::parse(title)?,
        })
    }
}

/// 正向结果容器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResultsContainer {
    pub item_count: usize,
}

/// 分类器的输入：页面上各个标记的状态
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageSnapshot {
    /// 抓取的地址
    pub url: String,
    /// 正向结果容器（不存在时为 `None`）
    pub results: Option<ResultsContainer>,
    /// 第一个负向结果容器的文本（不存在时为 `None`）
    pub no_results_text: Option<String>,
    /// 备用结构标记是否存在
    pub has_title: bool,
}

impl PageSnapshot {
    /// 解析 HTML 并提取各标记的状态
    pub fn from_html(url: impl Into<String>, html: &str, markers: &MarkerSet) -> Self {
        let document = Html::parse_document(html);

        let results = document
            .select(markers.results.selector())
            .next()
            .map(|container| ResultsContainer {
                item_count: container.select(markers.item.selector()).count(),
            });

        let no_results_text = document
            .select(markers.no_results.selector())
            .next()
            .map(|container| container.text().collect::<String>());

        Self {
            url: url.into(),
            results,
            no_results_text,
            has_title: markers.title.is_present(&document),
        }
    }

    /// 是否出现了任何一个标记
    pub fn has_any_marker(&self) -> bool {
        self.results.is_some() || self.no_results_text.is_some() || self.has_title
    }
}
