//! 会话抽象
//!
//! 一个会话每次只能完成一次“导航 + 等待渲染”，由持有它的 worker 独占使用。

use async_trait::async_trait;

use crate::error::{FetchError, SessionError};
use crate::models::Marker;

/// 可复用的有状态抓取会话（浏览器页面或 HTTP 客户端）
#[async_trait]
pub trait Session: Send {
    /// 导航到指定地址，会改变会话的当前页面
    async fn navigate(&mut self, url: &str) -> Result<(), FetchError>;

    /// 当前页面中是否存在任一标记
    async fn has_any(&mut self, markers: &[&Marker]) -> Result<bool, FetchError>;

    /// 当前页面的完整 HTML
    async fn html(&mut self) -> Result<String, FetchError>;

    /// 导航后页面内容是否还会继续变化
    ///
    /// 静态 HTTP 响应返回 `false`，等待标记时只检查一次。
    fn is_live(&self) -> bool {
        true
    }

    /// 关闭会话，重复调用必须无副作用
    async fn close(&mut self) -> Result<(), SessionError>;
}

#[async_trait]
impl<T: Session + ?Sized> Session for Box<T> {
    async fn navigate(&mut self, url: &str) -> Result<(), FetchError> {
        (**self).navigate(url).await
    }

    async fn has_any(&mut self, markers: &[&Marker]) -> Result<bool, FetchError> {
        (**self).has_any(markers).await
    }

    async fn html(&mut self) -> Result<String, FetchError> {
        (**self).html().await
    }

    fn is_live(&self) -> bool {
        (**self).is_live()
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        (**self).close().await
    }
}
