//! 一次批处理的计时与计数
//!
//! 由 `Dispatcher` 在每次运行时创建并持有，不使用全局状态。

use chrono::{DateTime, Local};
use std::time::Duration;
use tokio::time::Instant;

use crate::models::ClassificationOutcome;

#[derive(Debug, Clone)]
pub struct RunStats {
    pub total: usize,
    pub found: usize,
    pub not_found: usize,
    pub indeterminate: usize,
    pub errors: usize,
    pub started_at: DateTime<Local>,
    pub finished_at: Option<DateTime<Local>>,
    started: Instant,
    elapsed: Option<Duration>,
}

impl RunStats {
    /// 开始计时
    pub fn start(total: usize) -> Self {
        Self {
            total,
            found: 0,
            not_found: 0,
            indeterminate: 0,
            errors: 0,
            started_at: Local::now(),
            finished_at: None,
            started: Instant::now(),
            elapsed: None,
        }
    }

    pub fn record(&mut self, outcome: &ClassificationOutcome) {
        match outcome {
            ClassificationOutcome::Found { .. } => self.found += 1,
            ClassificationOutcome::NotFound => self.not_found += 1,
            ClassificationOutcome::Indeterminate => self.indeterminate += 1,
            ClassificationOutcome::Error { .. } => self.errors += 1,
        }
    }

    /// 已产生结果的 SKU 数量
    pub fn processed(&self) -> usize {
        self.found + self.not_found + self.indeterminate + self.errors
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Local::now());
        self.elapsed = Some(self.started.elapsed());
    }

    /// 运行耗时；尚未结束时返回到目前为止的耗时
    pub fn elapsed(&self) -> Duration {
        self.elapsed.unwrap_or_else(|| self.started.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_counts_and_duration() {
        let mut stats = RunStats::start(4);
        stats.record(&ClassificationOutcome::Found { count: Some(1) });
        stats.record(&ClassificationOutcome::NotFound);
        stats.record(&ClassificationOutcome::error("x"));
        assert_eq!(stats.processed(), 3);

        tokio::time::sleep(Duration::from_secs(3)).await;
        stats.finish();
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(stats.elapsed(), Duration::from_secs(3));
        assert!(stats.finished_at.is_some());
        assert_eq!((stats.found, stats.not_found, stats.errors), (1, 1, 1));
    }
}
