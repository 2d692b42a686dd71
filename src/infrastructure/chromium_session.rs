//! Chromium 页面会话 - 基础设施层
//!
//! 持有一个 Page，只暴露“导航 / 查询标记 / 读取 HTML”的能力

use async_trait::async_trait;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::debug;

use crate::error::{FetchError, SessionError};
use crate::infrastructure::session::Session;
use crate::models::Marker;

/// 浏览器页面会话
///
/// 职责：
/// - 独占一个 Page（一个标签页）
/// - 不认识 SKU，也不做分类
pub struct ChromiumSession {
    slot: usize,
    page: Option<Page>,
    navigation_timeout: Duration,
}

impl ChromiumSession {
    pub fn new(slot: usize, page: Page, navigation_timeout: Duration) -> Self {
        Self {
            slot,
            page: Some(page),
            navigation_timeout,
        }
    }

    fn page(&self) -> Result<&Page, FetchError> {
        self.page
            .as_ref()
            .ok_or(FetchError::SessionReleased(self.slot))
    }

    /// 执行 JS 代码并反序列化为指定类型
    async fn eval_as<T: DeserializeOwned>(&self, js_code: String) -> Result<T, FetchError> {
        let result = self.page()?.evaluate(js_code).await?;
        let json_value: JsonValue = result.into_value()?;
        Ok(serde_json::from_value(json_value)?)
    }
}

/// 生成检查任一选择器是否命中的脚本
fn marker_check_js(markers: &[&Marker]) -> Result<String, FetchError> {
    let selectors: Vec<&str> = markers.iter().map(|m| m.css()).collect();
    Ok(format!(
        "(() => {}.some(s => document.querySelector(s) !== null))()",
        serde_json::to_string(&selectors)?
    ))
}

#[async_trait]
impl Session for ChromiumSession {
    async fn navigate(&mut self, url: &str) -> Result<(), FetchError> {
        let page = self.page()?;
        debug!("[会话 {}] 导航到 {}", self.slot, url);

        match tokio::time::timeout(self.navigation_timeout, page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(FetchError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(FetchError::NavigationTimeout {
                url: url.to_string(),
                secs: self.navigation_timeout.as_secs(),
            }),
        }
    }

    async fn has_any(&mut self, markers: &[&Marker]) -> Result<bool, FetchError> {
        self.eval_as(marker_check_js(markers)?).await
    }

    async fn html(&mut self) -> Result<String, FetchError> {
        Ok(self.page()?.content().await?)
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        match self.page.take() {
            Some(page) => page
                .close()
                .await
                .map_err(|e| SessionError::close_failed(self.slot, e)),
            None => Ok(()),
        }
    }
}
