//! 事件总线
//!
//! 每种生命周期事件一个通道，另有一个合并流。订阅者按订阅顺序同步接收事件，
//! 不做缓冲：订阅之前发出的事件不会补发。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::Stream;
use futures_util::stream;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::event::{EventKind, TourEvent};
use super::types::SubscriptionId;

/// 事件处理函数
pub type EventHandler = Arc<dyn Fn(&TourEvent) + Send + Sync>;

#[derive(Clone)]
enum Sink {
    Handler(EventHandler),
    Stream(mpsc::UnboundedSender<TourEvent>),
}

#[derive(Clone)]
struct Subscriber {
    id: SubscriptionId,
    /// `None` 表示接收全部通道
    kind: Option<EventKind>,
    sink: Sink,
}

/// 事件总线
#[derive(Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<Subscriber>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// 订阅单个通道
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&TourEvent) + Send + Sync + 'static,
    {
        self.push(Some(kind), Sink::Handler(Arc::new(handler)))
    }

    /// 订阅全部通道
    pub fn subscribe_all<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&TourEvent) + Send + Sync + 'static,
    {
        self.push(None, Sink::Handler(Arc::new(handler)))
    }

    /// 取消订阅，返回该订阅是否存在
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        subscribers.len() != before
    }

    /// 合并流：按真实时间顺序产出全部通道的事件
    ///
    /// 流在创建时才开始接收；丢弃流即取消订阅。
    /// 缓冲区没有上限，持有流的一方必须持续轮询，不再需要时就丢弃。
    pub fn stream(&self) -> impl Stream<Item = TourEvent> + Send + Unpin + 'static {
        let (tx, rx) = mpsc::unbounded_channel();
        self.push(None, Sink::Stream(tx));
        Box::pin(stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        }))
    }

    /// 单个通道的流
    ///
    /// 缓冲规则与 [`EventBus::stream`] 相同。
    pub fn stream_of(&self, kind: EventKind) -> impl Stream<Item = TourEvent> + Send + Unpin + 'static {
        let (tx, rx) = mpsc::unbounded_channel();
        self.push(Some(kind), Sink::Stream(tx));
        Box::pin(stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        }))
    }

    /// 当前订阅数量
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// 同步派发事件
    ///
    /// 派发期间不持有锁，处理函数可以在回调里订阅或取消订阅。
    pub fn emit(&self, event: TourEvent) {
        let kind = event.kind();
        let targets: Vec<Subscriber> = self
            .subscribers
            .lock()
            .iter()
            .filter(|s| s.kind.is_none_or(|k| k == kind))
            .cloned()
            .collect();

        tracing::trace!(event = %kind, subscribers = targets.len(), "emit");

        let mut closed = Vec::new();
        for subscriber in targets {
            match &subscriber.sink {
                Sink::Handler(handler) => handler(&event),
                Sink::Stream(tx) => {
                    if tx.send(event.clone()).is_err() {
                        closed.push(subscriber.id);
                    }
                }
            }
        }

        if !closed.is_empty() {
            self.subscribers.lock().retain(|s| !closed.contains(&s.id));
        }
    }

    fn push(&self, kind: Option<EventKind>, sink: Sink) -> SubscriptionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.lock().push(Subscriber { id, kind, sink });
        id
    }
}
