//! 路由契约
//!
//! 导览只通过这里的 [`Router`] trait 接触宿主应用的路由系统。

use std::collections::HashSet;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use tokio::sync::broadcast;

/// 路由生命周期事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    /// 导航开始
    Start { url: String },
    /// 导航完成
    End { url: String },
    /// 导航被取消或拦截
    Cancel { url: String },
}

impl NavigationEvent {
    pub fn is_start(&self) -> bool {
        matches!(self, Self::Start { .. })
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Start { url } | Self::End { url } | Self::Cancel { url } => url,
        }
    }
}

/// 宿主路由
///
/// 导航结果为 `false` 表示导航被取消；未完成的导航会让导览一直等待，
/// 确保导航最终完成是实现者的责任。
pub trait Router: Send + Sync + 'static {
    /// 按完整路径导航
    fn navigate_by_url(&self, url: &str) -> BoxFuture<'static, bool>;

    /// 按结构化路由片段导航
    fn navigate(&self, segments: &[String]) -> BoxFuture<'static, bool>;

    /// 订阅导航事件，只接收订阅之后发生的事件
    fn events(&self) -> broadcast::Receiver<NavigationEvent>;
}

const EVENT_CAPACITY: usize = 64;

struct MemoryRouterInner {
    current_url: Mutex<String>,
    history: Mutex<Vec<String>>,
    blocked: Mutex<HashSet<String>>,
    events: broadcast::Sender<NavigationEvent>,
}

/// 内存路由
///
/// 不依赖任何界面框架，记录当前路径与历史，可以拦截指定路径。
#[derive(Clone)]
pub struct MemoryRouter {
    inner: Arc<MemoryRouterInner>,
}

impl MemoryRouter {
    pub fn new(initial_url: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(MemoryRouterInner {
                current_url: Mutex::new(initial_url.into()),
                history: Mutex::new(Vec::new()),
                blocked: Mutex::new(HashSet::new()),
                events,
            }),
        }
    }

    pub fn current_url(&self) -> String {
        self.inner.current_url.lock().clone()
    }

    /// 已完成的导航，按先后顺序
    pub fn history(&self) -> Vec<String> {
        self.inner.history.lock().clone()
    }

    /// 拦截到该路径的导航
    pub fn block(&self, url: impl Into<String>) {
        self.inner.blocked.lock().insert(url.into());
    }

    pub fn unblock(&self, url: &str) {
        self.inner.blocked.lock().remove(url);
    }

    /// 把路由片段拼成路径
    pub fn segments_to_url(segments: &[String]) -> String {
        let joined = segments
            .iter()
            .map(|s| s.trim_matches('/'))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        format!("/{joined}")
    }

    fn go(&self, url: String) -> BoxFuture<'static, bool> {
        let inner = Arc::clone(&self.inner);
        async move {
            let _ = inner.events.send(NavigationEvent::Start { url: url.clone() });
            tokio::task::yield_now().await;

            if inner.blocked.lock().contains(&url) {
                tracing::debug!(%url, "navigation blocked");
                let _ = inner.events.send(NavigationEvent::Cancel { url });
                return false;
            }

            *inner.current_url.lock() = url.clone();
            inner.history.lock().push(url.clone());
            let _ = inner.events.send(NavigationEvent::End { url });
            true
        }
        .boxed()
    }
}

impl Default for MemoryRouter {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Router for MemoryRouter {
    fn navigate_by_url(&self, url: &str) -> BoxFuture<'static, bool> {
        self.go(url.to_string())
    }

    fn navigate(&self, segments: &[String]) -> BoxFuture<'static, bool> {
        self.go(Self::segments_to_url(segments))
    }

    fn events(&self) -> broadcast::Receiver<NavigationEvent> {
        self.inner.events.subscribe()
    }
}
