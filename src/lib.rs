//! # SKU Exist Check
//!
//! 批量检查 SKU 是否能在商品搜索页上搜到
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（浏览器页面、HTTP 客户端），只暴露能力
//! - `Session` - 导航、检查标记、读取页面
//! - `SessionPool` - 固定槽位的会话池，启动时一次性创建，结束时统一释放
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个 SKU
//! - `SearchService` - 搜索并等待结果标记
//! - `Classifier` - 按优先级规则分类
//! - `ReportWriter` - 写结果 CSV / Excel
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个 SKU"的完整处理流程
//! - `SkuCtx` - 上下文封装（行号 + SKU + 会话槽位）
//! - `SkuFlow` - 流程编排（search → classify）
//! - `Worker` - 绑定一个会话，从共享队列拉取 SKU
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/dispatcher` - 分发与汇总，保证每行一条结果
//! - `orchestrator/batch_processor` - 应用生命周期与资源管理
//!
//! ## 模块结构

pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use cli::Cli;
pub use config::{Config, SessionKind};
pub use error::{AppError, AppResult};
pub use infrastructure::{Session, SessionPool};
pub use models::{ClassificationMode, ClassificationOutcome, ResultRecord, SkuRow};
pub use orchestrator::{App, BatchOutcome, Dispatcher};
pub use workflow::{SkuCtx, SkuFlow};
