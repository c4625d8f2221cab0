use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// 最近登录尝试的时间戳记录（按到达顺序，即时间顺序）
#[derive(Debug)]
pub struct AttemptTracker {
    attempts: VecDeque<Instant>,
    window: Duration,
    threshold: usize,
}

impl AttemptTracker {
    pub fn new(window: Duration, threshold: usize) -> Self {
        Self {
            attempts: VecDeque::new(),
            window,
            threshold,
        }
    }

    /// 从队头移除所有早于 `now - window` 的记录，返回 `now` 供调用方复用
    pub fn prune(&mut self, now: Instant) -> Instant {
        // 进程启动时间短于窗口时无法表示截止点，此时没有过期记录
        if let Some(cutoff) = now.checked_sub(self.window) {
            while self.attempts.front().is_some_and(|t| *t < cutoff) {
                self.attempts.pop_front();
            }
        }
        now
    }

    /// 记录一次尝试，返回是否已达到锁定阈值（含等于）
    pub fn record(&mut self, now: Instant) -> bool {
        self.attempts.push_back(now);
        self.attempts.len() >= self.threshold
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutStatus {
    pub locked_out: bool,
    pub recent_attempts: usize,
}

/// 进程内唯一的尝试记录，由 AppState 持有并传入登录处理函数
#[derive(Clone)]
pub struct LockoutGuard {
    tracker: Arc<Mutex<AttemptTracker>>,
}

impl LockoutGuard {
    pub fn new(window: Duration, threshold: usize) -> Self {
        Self {
            tracker: Arc::new(Mutex::new(AttemptTracker::new(window, threshold))),
        }
    }

    /// 清理过期记录并登记本次尝试
    pub async fn register_attempt(&self) -> LockoutStatus {
        self.register_attempt_at(Instant::now()).await
    }

    pub async fn register_attempt_at(&self, now: Instant) -> LockoutStatus {
        let mut tracker = self.tracker.lock().await;
        let now = tracker.prune(now);
        if tracker.is_empty() {
            tracing::trace!(window_secs = tracker.window().as_secs(), "窗口内没有历史尝试");
        }
        let locked_out = tracker.record(now);

        tracing::debug!(
            recent_attempts = tracker.len(),
            threshold = tracker.threshold(),
            window_secs = tracker.window().as_secs(),
            "登记登录尝试"
        );

        LockoutStatus {
            locked_out,
            recent_attempts: tracker.len(),
        }
    }

    /// 当前窗口内的尝试次数（不清理）
    pub async fn recent_attempts(&self) -> usize {
        self.tracker.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(30);

    // 保证 base - WINDOW 可表示
    fn base() -> Instant {
        Instant::now() + WINDOW * 2
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let mut tracker = AttemptTracker::new(WINDOW, 25);
        let now = base();

        for i in 1..25 {
            assert!(!tracker.record(now), "第 {} 次尝试不应锁定", i);
        }
        assert!(tracker.record(now), "第 25 次尝试应锁定");
        assert!(tracker.record(now));
        assert_eq!(tracker.len(), 26);
    }

    #[test]
    fn test_prune_removes_only_expired_from_front() {
        let mut tracker = AttemptTracker::new(WINDOW, 25);
        let start = base();

        tracker.record(start);
        tracker.record(start + Duration::from_secs(10));
        tracker.record(start + Duration::from_secs(20));

        // 恰好在窗口边界上的记录保留
        tracker.prune(start + WINDOW);
        assert_eq!(tracker.len(), 3);

        tracker.prune(start + WINDOW + Duration::from_millis(1));
        assert_eq!(tracker.len(), 2);

        tracker.prune(start + Duration::from_secs(51));
        assert_eq!(tracker.len(), 0);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_accessors_reflect_construction() {
        let tracker = AttemptTracker::new(WINDOW, 7);
        assert_eq!(tracker.window(), WINDOW);
        assert_eq!(tracker.threshold(), 7);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_prune_is_idempotent() {
        let mut tracker = AttemptTracker::new(WINDOW, 25);
        let start = base();
        for s in 0..5 {
            tracker.record(start + Duration::from_secs(s * 10));
        }

        let now = start + Duration::from_secs(45);
        assert_eq!(tracker.prune(now), now);
        let after_first = tracker.len();
        tracker.prune(now);
        tracker.prune(now);
        assert_eq!(tracker.len(), after_first);
        assert_eq!(after_first, 3);
    }

    #[test]
    fn test_prune_before_window_elapsed_keeps_everything() {
        let mut tracker = AttemptTracker::new(Duration::from_secs(u64::MAX / 4), 25);
        let now = Instant::now();
        tracker.record(now);
        tracker.prune(now);
        assert_eq!(tracker.len(), 1);
    }

    #[tokio::test]
    async fn test_guard_lockout_lifts_after_window() {
        let guard = LockoutGuard::new(WINDOW, 3);
        let start = base();

        assert!(!guard.register_attempt_at(start).await.locked_out);
        assert!(!guard.register_attempt_at(start).await.locked_out);
        let status = guard.register_attempt_at(start).await;
        assert!(status.locked_out);
        assert_eq!(status.recent_attempts, 3);

        // 窗口过去后旧记录被清理，本次是唯一一条
        let later = start + WINDOW + Duration::from_secs(1);
        let status = guard.register_attempt_at(later).await;
        assert!(!status.locked_out);
        assert_eq!(status.recent_attempts, 1);
        assert_eq!(guard.recent_attempts().await, 1);
    }

    #[tokio::test]
    async fn test_guard_clones_share_state() {
        let guard = LockoutGuard::new(WINDOW, 2);
        let other = guard.clone();

        guard.register_attempt().await;
        assert!(other.register_attempt().await.locked_out);
    }
}
