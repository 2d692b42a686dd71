use chromiumoxide::Browser;
use futures::StreamExt;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info};

use super::BrowserHost;
use crate::error::SessionError;

/// 连接到已开启远程调试端口的浏览器
///
/// 适合需要复用已登录状态或手动观察抓取过程的场景，
/// 例如先用 `--remote-debugging-port=9222` 启动 Chrome。
pub async fn connect_to_browser(port: u16) -> Result<BrowserHost, SessionError> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (browser, mut handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        SessionError::ConnectionFailed {
            port,
            source: Box::new(e),
        }
    })?;
    debug!("浏览器连接成功");

    // 在后台处理浏览器事件
    let handler_task = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(Duration::from_millis(300)).await;

    Ok(BrowserHost::new(browser, handler_task, false))
}
