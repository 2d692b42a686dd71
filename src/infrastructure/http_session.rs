//! HTTP 会话 - 基础设施层
//!
//! 不执行脚本，直接请求搜索页并缓存响应体，适用于服务端渲染的结果页。

use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;
use std::time::Duration;
use tracing::debug;

use crate::error::{FetchError, SessionError};
use crate::infrastructure::session::Session;
use crate::models::Marker;

pub struct HttpSession {
    slot: usize,
    client: Option<Client>,
    timeout: Duration,
    body: Option<String>,
}

impl HttpSession {
    /// 创建带 User-Agent 和请求超时的客户端
    pub fn new(slot: usize, user_agent: &str, timeout: Duration) -> Result<Self, SessionError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| SessionError::creation_failed(slot, e))?;

        Ok(Self {
            slot,
            client: Some(client),
            timeout,
            body: None,
        })
    }

    fn client(&self) -> Result<&Client, FetchError> {
        self.client
            .as_ref()
            .ok_or(FetchError::SessionReleased(self.slot))
    }
}

#[async_trait]
impl Session for HttpSession {
    async fn navigate(&mut self, url: &str) -> Result<(), FetchError> {
        self.body = None;
        debug!("[会话 {}] GET {}", self.slot, url);

        let timeout_secs = self.timeout.as_secs();
        let navigation_error = |e: reqwest::Error| {
            if e.is_timeout() {
                FetchError::NavigationTimeout {
                    url: url.to_string(),
                    secs: timeout_secs,
                }
            } else {
                FetchError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        };

        let response = self
            .client()?
            .get(url)
            .send()
            .await
            .map_err(navigation_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        self.body = Some(response.text().await.map_err(navigation_error)?);
        Ok(())
    }

    async fn has_any(&mut self, markers: &[&Marker]) -> Result<bool, FetchError> {
        let Some(body) = self.body.as_deref() else {
            return Ok(false);
        };
        let document = Html::parse_document(body);
        Ok(markers.iter().any(|m| m.is_present(&document)))
    }

    async fn html(&mut self) -> Result<String, FetchError> {
        Ok(self.body.clone().unwrap_or_default())
    }

    fn is_live(&self) -> bool {
        false
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        self.client = None;
        self.body = None;
        Ok(())
    }
}
