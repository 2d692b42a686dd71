//! 浏览器宿主
//!
//! 负责得到一个可用的 Chromium：启动新实例，或者连接到已开启远程调试端口的实例。

pub mod connection;
pub mod headless;

use chromiumoxide::{Browser, Page};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::SessionError;

pub use connection::connect_to_browser;
pub use headless::launch_browser;

/// 持有 Browser 以及它的事件处理任务
pub struct BrowserHost {
    browser: Browser,
    handler: JoinHandle<()>,
    /// 是否由本程序启动；连接到的外部浏览器不会被关闭
    launched: bool,
}

impl BrowserHost {
    pub(crate) fn new(browser: Browser, handler: JoinHandle<()>, launched: bool) -> Self {
        Self {
            browser,
            handler,
            launched,
        }
    }

    /// 打开一个新的空白页面
    pub async fn new_page(&self, slot: usize) -> Result<Page, SessionError> {
        self.browser
            .new_page("about:blank")
            .await
            .map_err(|e| SessionError::creation_failed(slot, e))
    }

    /// 关闭浏览器（仅限自己启动的实例）并停止事件处理任务
    pub async fn shutdown(mut self) -> Result<(), SessionError> {
        let result = if self.launched {
            debug!("正在关闭浏览器...");
            match self.browser.close().await {
                Ok(_) => {
                    let _ = self.browser.wait().await;
                    info!("✓ 浏览器已关闭");
                    Ok(())
                }
                Err(e) => Err(SessionError::ShutdownFailed {
                    source: Box::new(e),
                }),
            }
        } else {
            debug!("断开与外部浏览器的连接");
            Ok(())
        };

        self.handler.abort();
        result
    }
}
