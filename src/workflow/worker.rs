//! Worker - 流程层
//!
//! 每个 worker 绑定一个会话槽位，从共享队列里逐个拉取 SKU，
//! 所以同一会话上永远只有一个抓取在进行。

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::error::FetchError;
use crate::infrastructure::{Session, SessionSlot};
use crate::models::{ClassificationOutcome, ResultRecord, SkuRow};
use crate::utils::logging::truncate_text;
use crate::workflow::sku_ctx::SkuCtx;
use crate::workflow::sku_flow::SkuFlow;

/// 共享工作队列：对输入集合的原子游标
///
/// 每一行只会被一个 worker 取到一次。
pub struct WorkQueue {
    rows: Vec<SkuRow>,
    cursor: AtomicUsize,
}

impl WorkQueue {
    pub fn new(rows: Vec<SkuRow>) -> Self {
        Self {
            rows,
            cursor: AtomicUsize::new(0),
        }
    }

    /// 取出下一行；队列耗尽时返回 `None`
    pub fn next(&self) -> Option<SkuRow> {
        let position = self.cursor.fetch_add(1, Ordering::SeqCst);
        self.rows.get(position).cloned()
    }

    pub fn has_remaining(&self) -> bool {
        self.cursor.load(Ordering::SeqCst) < self.rows.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[SkuRow] {
        &self.rows
    }
}

pub struct Worker<S> {
    slot: SessionSlot<S>,
    flow: Arc<SkuFlow>,
    request_delay: Duration,
}

impl<S: Session> Worker<S> {
    pub fn new(slot: SessionSlot<S>, flow: Arc<SkuFlow>, request_delay: Duration) -> Self {
        Self {
            slot,
            flow,
            request_delay,
        }
    }

    /// 处理队列直到耗尽，返回本 worker 处理的 SKU 数量
    ///
    /// 单个 SKU 的失败只会变成一条 `Error` 记录，不会中断 worker。
    pub async fn run(self, queue: Arc<WorkQueue>, records: UnboundedSender<ResultRecord>) -> usize {
        let slot = self.slot.index();
        let mut processed = 0;
        debug!("[会话 {}] worker 启动", slot);

        while let Some(row) = queue.next() {
            let ctx = SkuCtx::new(&row, slot);
            let outcome = self.process(&ctx).await;
            log_outcome(&ctx, &outcome);

            if records.send(ResultRecord::new(row, outcome)).is_err() {
                warn!("[会话 {}] 结果接收端已关闭，worker 提前退出", slot);
                break;
            }
            processed += 1;

            if !self.request_delay.is_zero() && queue.has_remaining() {
                sleep(self.request_delay).await;
            }
        }

        debug!("[会话 {}] worker 结束，共处理 {} 个 SKU", slot, processed);
        processed
    }

    async fn process(&self, ctx: &SkuCtx) -> ClassificationOutcome {
        let mut guard = self.slot.lock().await;
        let Some(session) = guard.as_mut() else {
            return ClassificationOutcome::error(
                FetchError::SessionReleased(self.slot.index()).to_string(),
            );
        };

        match AssertUnwindSafe(self.flow.run(session, ctx))
            .catch_unwind()
            .await
        {
            Ok(outcome) => outcome,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!("{} ❌ 处理过程中发生异常: {}", ctx, message);
                ClassificationOutcome::error(format!("处理过程中发生异常: {}", message))
            }
        }
    }
}

fn log_outcome(ctx: &SkuCtx, outcome: &ClassificationOutcome) {
    match outcome {
        ClassificationOutcome::Found { .. } | ClassificationOutcome::NotFound => {
            info!("{} ✓ {}", ctx, outcome)
        }
        ClassificationOutcome::Indeterminate => warn!("{} ⚠️ {}", ctx, outcome),
        ClassificationOutcome::Error { message } => {
            error!("{} ❌ {}", ctx, truncate_text(message, 200))
        }
    }
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "未知异常".to_string()
    }
}
