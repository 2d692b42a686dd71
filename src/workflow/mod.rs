//! 流程层（Workflow Layer）
//!
//! - `SkuCtx`：处理上下文（行号 + SKU + 会话槽位）
//! - `SkuFlow`：一个 SKU 的完整流程（search → classify）
//! - `Worker`：绑定一个会话槽位，从共享队列拉取 SKU 直到耗尽

pub mod sku_ctx;
pub mod sku_flow;
pub mod worker;

pub use sku_ctx::SkuCtx;
pub use sku_flow::SkuFlow;
pub use worker::{WorkQueue, Worker};
