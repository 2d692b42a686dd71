//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 应用生命周期
//! - 初始化（配置校验、读取输入、创建会话池）
//! - 运行（调度 + Ctrl-C 中断）
//! - 清理（释放会话、关闭浏览器、写出结果）
//!
//! ### `dispatcher` - 调度与汇总
//! - 每个会话槽位一个 worker，拉取共享队列
//! - 汇总结果记录，保证输入 M 行输出 M 条
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (App：资源与生命周期)
//!     ↓
//! dispatcher (Vec<SkuRow> → Vec<ResultRecord>)
//!     ↓
//! workflow::Worker / SkuFlow (处理单个 SKU)
//!     ↓
//! services (能力层：search / classify / report)
//!     ↓
//! infrastructure (基础设施：Session / SessionPool)
//! ```

pub mod batch_processor;
pub mod dispatcher;
pub mod run_stats;

pub use batch_processor::{App, DynSession};
pub use dispatcher::{BatchOutcome, Dispatcher};
pub use run_stats::RunStats;
