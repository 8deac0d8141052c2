//! # 请求生命周期计数
//!
//! ## 设计思路
//!
//! 全局忙碌指示只取决于“在途请求数 > 0”。计数器由会话持有并显式传递，
//! 不使用全局变量。`begin()` 返回 RAII 守卫 `InFlightGuard`：
//! 构造时加一，`Drop` 时减一，无论请求成功、失败还是 future 被中途丢弃，
//! 计数都会对称恢复，忙碌指示不会卡住。
//!
//! ## 实现思路
//!
//! - 计数与忙碌状态在同一把锁内更新，0→1 / 1→0 的翻转顺序与计数严格一致。
//! - 忙碌状态通过 `watch` 通道广播，观察者只关心最新值。
//! - 减一使用饱和运算，计数永远不会为负。

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

struct LifecycleInner {
    in_flight: Mutex<usize>,
    busy_tx: watch::Sender<bool>,
}

/// 在途请求计数器。克隆得到同一计数器的句柄。
#[derive(Clone)]
pub struct RequestLifecycle {
    inner: Arc<LifecycleInner>,
}

impl Default for RequestLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestLifecycle {
    pub fn new() -> Self {
        let (busy_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(LifecycleInner {
                in_flight: Mutex::new(0),
                busy_tx,
            }),
        }
    }

    // 守卫在 Drop 中也要能减计数，锁中毒时直接取回内部值
    fn counter(&self) -> MutexGuard<'_, usize> {
        self.inner.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 当前在途请求数。
    pub fn in_flight(&self) -> usize {
        *self.counter()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight() > 0
    }

    /// 订阅忙碌状态（`true` = 有请求在途）。
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.busy_tx.subscribe()
    }

    /// 标记一个请求开始。
    pub fn begin(&self) -> InFlightGuard {
        let mut count = self.counter();
        *count += 1;
        if *count == 1 {
            log::debug!("⏳ 请求开始，进入忙碌状态");
            self.inner.busy_tx.send_replace(true);
        }
        InFlightGuard {
            lifecycle: self.clone(),
        }
    }

    fn finish(&self) {
        let mut count = self.counter();
        *count = count.saturating_sub(1);
        if *count == 0 {
            log::debug!("✅ 在途请求清零，退出忙碌状态");
            self.inner.busy_tx.send_replace(false);
        }
    }
}

/// 在途请求守卫，离开作用域时计数减一。
#[must_use = "守卫被立即丢弃会让计数马上回落"]
pub struct InFlightGuard {
    lifecycle: RequestLifecycle,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.lifecycle.finish();
    }
}
