//! 导航守卫
//!
//! 单槽、一次性、可取消的订阅：下一次导航开始时执行回调。每次重新布防都会先取消旧的槽位。

use parking_lot::Mutex;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;

use super::router::NavigationEvent;

#[derive(Default)]
pub struct NavigationGuard {
    slot: Mutex<Option<CancellationToken>>,
}

impl NavigationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// 布防：在 `events` 上等待第一个导航开始事件，然后执行 `on_start`
    ///
    /// 必须在 tokio 运行时中调用。
    pub fn arm<F>(&self, mut events: broadcast::Receiver<NavigationEvent>, on_start: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let token = CancellationToken::new();
        if let Some(previous) = self.slot.lock().replace(token.clone()) {
            previous.cancel();
        }

        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => {}
                started = next_start(&mut events) => {
                    if started && !token.is_cancelled() {
                        token.cancel();
                        on_start();
                    }
                }
            }
        });
    }

    /// 撤防，未触发的回调不会再执行
    pub fn disarm(&self) {
        if let Some(token) = self.slot.lock().take() {
            token.cancel();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.slot.lock().as_ref().is_some_and(|token| !token.is_cancelled())
    }
}

impl Drop for NavigationGuard {
    fn drop(&mut self) {
        self.disarm();
    }
}

async fn next_start(events: &mut broadcast::Receiver<NavigationEvent>) -> bool {
    loop {
        match events.recv().await {
            Ok(event) if event.is_start() => return true,
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "navigation guard lagged behind router events");
            }
            Err(RecvError::Closed) => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn start(url: &str) -> NavigationEvent {
        NavigationEvent::Start { url: url.into() }
    }

    async fn settle() {
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn fires_once_on_first_navigation_start() {
        let (tx, _) = broadcast::channel(8);
        let guard = NavigationGuard::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        guard.arm(tx.subscribe(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tx.send(NavigationEvent::End { url: "/a".into() }).unwrap();
        tx.send(start("/b")).unwrap();
        tx.send(start("/c")).unwrap();
        settle().await;

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!guard.is_armed());
    }

    #[tokio::test]
    async fn rearming_cancels_the_previous_slot() {
        let (tx, _) = broadcast::channel(8);
        let guard = NavigationGuard::new();
        let fired = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&fired);
        guard.arm(tx.subscribe(), move || first.lock().push("first"));
        let second = Arc::clone(&fired);
        guard.arm(tx.subscribe(), move || second.lock().push("second"));

        tx.send(start("/x")).unwrap();
        settle().await;

        assert_eq!(*fired.lock(), vec!["second"]);
    }

    #[tokio::test]
    async fn disarmed_guard_never_fires() {
        let (tx, _) = broadcast::channel(8);
        let guard = NavigationGuard::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        guard.arm(tx.subscribe(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        guard.disarm();

        tx.send(start("/x")).unwrap();
        settle().await;

        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
