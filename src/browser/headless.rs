use std::path::Path;

use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info};

use super::BrowserHost;
use crate::error::SessionError;

/// 启动一个新的 Chromium 实例
///
/// # 参数
/// - `headless`: 是否无头运行
/// - `chrome_executable`: 浏览器可执行文件路径，`None` 时由 chromiumoxide 自动查找
pub async fn launch_browser(
    headless: bool,
    chrome_executable: Option<&Path>,
) -> Result<BrowserHost, SessionError> {
    info!(
        "🚀 启动{}浏览器...",
        if headless { "无头" } else { "可视化" }
    );

    let mut builder = BrowserConfig::builder();
    builder = if headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };
    if let Some(path) = chrome_executable {
        debug!("浏览器路径: {}", path.display());
        builder = builder.chrome_executable(path);
    }

    let config = builder
        .args(vec![
            "--no-sandbox",            // 禁用沙盒，防止权限问题导致的崩溃
            "--disable-dev-shm-usage", // 防止共享内存不足
            "--disable-gpu",
        ])
        .build()
        .map_err(|e| {
            error!("配置浏览器失败: {}", e);
            SessionError::ConfigurationFailed(e)
        })?;

    let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        SessionError::LaunchFailed {
            source: Box::new(e),
        }
    })?;
    debug!("浏览器启动成功");

    // 在后台处理浏览器事件
    let handler_task = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 等待浏览器状态同步
    sleep(Duration::from_millis(300)).await;

    Ok(BrowserHost::new(browser, handler_task, true))
}
