//! 会话池 - 基础设施层
//!
//! 启动时一次性创建全部会话，按固定槽位 `[0, N)` 分配给 worker，
//! 批处理结束后统一释放。

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

use crate::error::{AppResult, SessionError};
use crate::infrastructure::session::Session;

/// 会话池
///
/// 每个槽位是 `Mutex<Option<S>>`：
/// - 锁保证同一时刻只有一个抓取在使用该会话
/// - `None` 表示会话已被释放
pub struct SessionPool<S> {
    slots: Vec<Arc<Mutex<Option<S>>>>,
}

/// 某个槽位的句柄，由对应的 worker 持有
pub struct SessionSlot<S> {
    index: usize,
    inner: Arc<Mutex<Option<S>>>,
}

impl<S> Clone for SessionSlot<S> {
    fn clone(&self) -> Self {
        Self {
            index: self.index,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Session> SessionSlot<S> {
    pub fn index(&self) -> usize {
        self.index
    }

    /// 锁定槽位；会话已释放时守卫内为 `None`
    pub async fn lock(&self) -> MutexGuard<'_, Option<S>> {
        self.inner.lock().await
    }
}

impl<S: Session> SessionPool<S> {
    /// 创建会话池，`factory` 按槽位依次创建会话
    ///
    /// 任一会话创建失败都会关闭已创建的会话并返回错误。
    pub async fn build<F, Fut>(size: usize, mut factory: F) -> AppResult<Self>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = AppResult<S>>,
    {
        if size == 0 {
            return Err(SessionError::EmptyPool.into());
        }

        info!("🔧 正在创建 {} 个会话...", size);
        let mut sessions = Vec::with_capacity(size);

        for slot in 0..size {
            match factory(slot).await {
                Ok(session) => {
                    debug!("会话 {} 创建成功", slot);
                    sessions.push(session);
                }
                Err(e) => {
                    error!("会话 {} 创建失败: {}", slot, e);
                    for (created, mut session) in sessions.into_iter().enumerate() {
                        if let Err(close_err) = session.close().await {
                            warn!("回收会话 {} 失败: {}", created, close_err);
                        }
                    }
                    return Err(e);
                }
            }
        }

        info!("✓ {} 个会话已就绪", size);
        Ok(Self::from_sessions(sessions))
    }

    /// 直接用已有会话组成会话池
    pub fn from_sessions(sessions: Vec<S>) -> Self {
        Self {
            slots: sessions
                .into_iter()
                .map(|s| Arc::new(Mutex::new(Some(s))))
                .collect(),
        }
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// 获取槽位句柄；越界时返回 `None`
    pub fn acquire(&self, index: usize) -> Option<SessionSlot<S>> {
        self.slots.get(index).map(|inner| SessionSlot {
            index,
            inner: Arc::clone(inner),
        })
    }

    /// 关闭所有会话，每个会话只关闭一次
    ///
    /// 已释放的槽位会被跳过；所有槽位都尝试关闭后，返回第一个关闭错误。
    pub async fn release_all(&self) -> AppResult<usize> {
        let mut closed = 0;
        let mut first_error = None;

        for (index, slot) in self.slots.iter().enumerate() {
            let taken = slot.lock().await.take();
            let Some(mut session) = taken else {
                continue;
            };

            match session.close().await {
                Ok(()) => {
                    closed += 1;
                    debug!("会话 {} 已关闭", index);
                }
                Err(e) => {
                    error!("会话 {} 关闭失败: {}", index, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e.into()),
            None => {
                info!("🧹 已释放 {} 个会话", closed);
                Ok(closed)
            }
        }
    }
}
