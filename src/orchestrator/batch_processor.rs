//! 批量 SKU 处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责资源管理和生命周期。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：校验配置、读取输入表、创建会话池
//! 2. **批量处理**：委托 `Dispatcher` 处理全部 SKU，Ctrl-C 时提前终止
//! 3. **资源管理**：无论结果如何都会释放会话池并关闭浏览器
//! 4. **结果输出**：写出结果文件并打印统计
//!
//! ## 设计特点
//!
//! - **资源所有者**：唯一持有 `BrowserHost` 和 `SessionPool` 的模块
//! - **失败快速**：任一会话创建失败都会中止启动，不会开始处理

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::browser::{self, BrowserHost};
use crate::config::{Config, SessionKind};
use crate::error::{AppError, AppResult};
use crate::infrastructure::{ChromiumSession, HttpSession, Session, SessionPool};
use crate::models::{load_input_table, InputTable};
use crate::orchestrator::dispatcher::Dispatcher;
use crate::services::ReportWriter;
use crate::utils::logging::{log_rows_loaded, log_startup, print_final_stats};
use crate::workflow::SkuFlow;

/// 会话池中的会话类型：浏览器页面或 HTTP 客户端
pub type DynSession = Box<dyn Session>;

/// 应用主结构
pub struct App {
    input: InputTable,
    pool: SessionPool<DynSession>,
    browser: Option<BrowserHost>,
    dispatcher: Dispatcher,
    writer: ReportWriter,
}

impl App {
    /// 初始化应用
    ///
    /// 输入表在创建会话之前读取，缺列或文件不存在时不会启动浏览器。
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate().context("配置校验失败")?;
        log_startup(&config);

        let input = load_input_table(&config.input_path, &config.sku_column).await?;
        if input.is_empty() {
            warn!("⚠️ 输入文件中没有任何数据行");
        }
        log_rows_loaded(input.len(), &config.input_path);

        let flow = Arc::new(SkuFlow::from_config(&config)?);
        let dispatcher = Dispatcher::new(flow, config.request_delay());
        let writer = ReportWriter::new(&config.output_path, config.mode);

        let (pool, browser) = build_pool(&config).await.context("创建会话池失败")?;

        Ok(Self {
            input,
            pool,
            browser,
            dispatcher,
            writer,
        })
    }

    /// 运行应用主逻辑
    ///
    /// 处理结束（或被中断）后先释放资源再写结果；释放失败在结果写完后返回。
    pub async fn run(self) -> Result<()> {
        let Self {
            input,
            pool,
            browser,
            dispatcher,
            writer,
        } = self;

        let outcome = dispatcher
            .run_until(&pool, input.rows.clone(), shutdown_signal())
            .await;

        let teardown = teardown(&pool, browser).await;
        if let Err(e) = &teardown {
            error!("❌ 释放资源失败: {}", e);
        }

        writer
            .write(&input.headers, &outcome.records)
            .await
            .context("写入结果文件失败")?;

        if outcome.interrupted {
            warn!("⚠️ 运行被中断，未处理的 SKU 已记为错误");
        }
        print_final_stats(&outcome.stats, writer.output_path());

        teardown.context("释放会话失败")?;
        Ok(())
    }
}

/// 按配置创建会话池
///
/// 浏览器模式下返回的 `BrowserHost` 需要在会话池释放后关闭。
async fn build_pool(config: &Config) -> AppResult<(SessionPool<DynSession>, Option<BrowserHost>)> {
    let timeout = config.navigation_timeout();

    match config.session_kind {
        SessionKind::Http => {
            let user_agent = config.user_agent.as_str();
            let pool = SessionPool::build(config.pool_size, move |slot| async move {
                let session = HttpSession::new(slot, user_agent, timeout)?;
                Ok::<_, AppError>(Box::new(session) as DynSession)
            })
            .await?;
            Ok((pool, None))
        }
        SessionKind::Browser => {
            let host = match config.browser_debug_port {
                Some(port) => browser::connect_to_browser(port).await?,
                None => {
                    browser::launch_browser(config.headless, config.chrome_executable.as_deref())
                        .await?
                }
            };

            let host_ref = &host;
            let built = SessionPool::build(config.pool_size, move |slot| async move {
                let page = host_ref.new_page(slot).await?;
                Ok::<_, AppError>(Box::new(ChromiumSession::new(slot, page, timeout)) as DynSession)
            })
            .await;

            match built {
                Ok(pool) => Ok((pool, Some(host))),
                Err(e) => {
                    if let Err(shutdown_err) = host.shutdown().await {
                        warn!("关闭浏览器失败: {}", shutdown_err);
                    }
                    Err(e)
                }
            }
        }
    }
}

/// 释放全部会话，再关闭浏览器；两步都会执行
async fn teardown(pool: &SessionPool<DynSession>, browser: Option<BrowserHost>) -> AppResult<()> {
    let released = pool.release_all().await;
    let closed = match browser {
        Some(host) => host.shutdown().await.map_err(AppError::from),
        None => Ok(()),
    };

    released?;
    closed?;
    info!("✓ 资源已全部释放");
    Ok(())
}

/// Ctrl-C 信号；无法注册监听时永不触发
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("无法监听 Ctrl-C 信号: {}", e);
        futures::future::pending::<()>().await;
    }
}
