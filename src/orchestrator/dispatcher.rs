//! 调度器 - 编排层
//!
//! ## 职责
//!
//! 1. 为会话池的每个槽位启动一个 worker（拉取式，共享同一个 `WorkQueue`）
//! 2. 收集所有结果记录（到达顺序不保证）
//! 3. 外部中断时终止所有 worker，并为未处理的 SKU 补上 `Error` 记录
//!
//! 无论中途发生什么，输入 M 个 SKU 就输出 M 条记录。

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::infrastructure::{Session, SessionPool};
use crate::models::{ClassificationOutcome, ResultRecord, SkuRow};
use crate::orchestrator::run_stats::RunStats;
use crate::utils::logging::log_progress;
use crate::workflow::{SkuFlow, WorkQueue, Worker};

/// 中断后补写的错误信息
pub const INTERRUPTED_MESSAGE: &str = "interrupted: 运行被中断，未处理";
/// worker 意外退出后补写的错误信息
pub const WORKER_LOST_MESSAGE: &str = "worker 意外退出，未处理";

/// 一次批处理的结果
#[derive(Debug)]
pub struct BatchOutcome {
    /// 每个输入行恰好一条，顺序不保证
    pub records: Vec<ResultRecord>,
    pub stats: RunStats,
    /// 是否因外部中断而提前结束
    pub interrupted: bool,
}

pub struct Dispatcher {
    flow: Arc<SkuFlow>,
    request_delay: Duration,
}

impl Dispatcher {
    pub fn new(flow: Arc<SkuFlow>, request_delay: Duration) -> Self {
        Self {
            flow,
            request_delay,
        }
    }

    /// 处理全部 SKU，直到队列耗尽
    pub async fn run_all<S>(&self, pool: &SessionPool<S>, rows: Vec<SkuRow>) -> BatchOutcome
    where
        S: Session + 'static,
    {
        self.run_until(pool, rows, futures::future::pending()).await
    }

    /// 处理全部 SKU，`shutdown` 完成时提前终止
    ///
    /// 终止时正在进行的抓取直接被丢弃，未产生结果的行补写 `Error` 记录。
    /// 会话池的释放由调用方负责。
    pub async fn run_until<S, F>(
        &self,
        pool: &SessionPool<S>,
        rows: Vec<SkuRow>,
        shutdown: F,
    ) -> BatchOutcome
    where
        S: Session + 'static,
        F: Future<Output = ()>,
    {
        let total = rows.len();
        let mut stats = RunStats::start(total);
        let queue = Arc::new(WorkQueue::new(rows));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut workers = JoinSet::new();
        for index in 0..pool.size() {
            let Some(slot) = pool.acquire(index) else {
                continue;
            };
            let worker = Worker::new(slot, Arc::clone(&self.flow), self.request_delay);
            workers.spawn(worker.run(Arc::clone(&queue), tx.clone()));
        }
        drop(tx);
        info!("🚚 {} 个 worker 已启动，共 {} 个 SKU", workers.len(), total);

        let mut records = Vec::with_capacity(total);
        let mut interrupted = false;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                received = rx.recv() => match received {
                    Some(record) => {
                        stats.record(&record.outcome);
                        log_progress(stats.processed(), total);
                        records.push(record);
                    }
                    None => break,
                },
                _ = &mut shutdown, if !interrupted => {
                    warn!("⚠️ 收到中断信号，正在停止所有 worker...");
                    interrupted = true;
                    workers.abort_all();
                }
            }
        }

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(processed) => debug!("worker 正常结束，处理 {} 个 SKU", processed),
                Err(e) if e.is_cancelled() => debug!("worker 已被终止"),
                Err(e) => error!("❌ worker 任务执行失败: {}", e),
            }
        }

        let message = if interrupted {
            INTERRUPTED_MESSAGE
        } else {
            WORKER_LOST_MESSAGE
        };
        for record in backfill_missing(queue.rows(), &records, message) {
            stats.record(&record.outcome);
            records.push(record);
        }

        stats.finish();
        BatchOutcome {
            records,
            stats,
            interrupted,
        }
    }
}

/// 为没有产生记录的行生成 `Error` 记录
fn backfill_missing(rows: &[SkuRow], records: &[ResultRecord], message: &str) -> Vec<ResultRecord> {
    let seen: HashSet<usize> = records.iter().map(|r| r.row.index).collect();
    let missing: Vec<ResultRecord> = rows
        .iter()
        .filter(|row| !seen.contains(&row.index))
        .map(|row| ResultRecord::new(row.clone(), ClassificationOutcome::error(message)))
        .collect();

    if !missing.is_empty() {
        warn!("⚠️ {} 个 SKU 没有处理结果，已记为错误", missing.len());
    }
    missing
}
