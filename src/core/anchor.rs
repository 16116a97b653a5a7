//! 锚点与锚点注册表

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::bus::EventBus;
use super::error::{Result, TourError};
use super::event::TourEvent;
use super::step::Step;
use super::types::AnchorId;

/// 锚点：负责把步骤显示在界面上的句柄
///
/// 两个方法都是“发出即忘”，没有返回值。
pub trait TourAnchor: Send + Sync {
    fn show_step(&self, step: &Step);
    fn hide_step(&self);
}

/// 锚点注册表
///
/// 同一时刻每个 `anchor_id` 最多绑定一个锚点。
pub struct AnchorRegistry {
    anchors: Mutex<HashMap<AnchorId, Arc<dyn TourAnchor>>>,
    bus: Arc<EventBus>,
}

impl AnchorRegistry {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            anchors: Mutex::new(HashMap::new()),
            bus,
        }
    }

    /// 注册锚点；已绑定时返回 [`TourError::DuplicateAnchor`]
    pub fn register(&self, anchor_id: impl Into<AnchorId>, anchor: Arc<dyn TourAnchor>) -> Result<()> {
        let anchor_id = anchor_id.into();
        {
            let mut anchors = self.anchors.lock();
            if anchors.contains_key(&anchor_id) {
                return Err(TourError::DuplicateAnchor(anchor_id));
            }
            anchors.insert(anchor_id.clone(), anchor);
        }
        tracing::debug!(anchor = %anchor_id, "anchor registered");
        self.bus.emit(TourEvent::AnchorRegister(anchor_id));
        Ok(())
    }

    /// 注销锚点；未绑定时不是错误，事件照常发出
    pub fn unregister(&self, anchor_id: &str) {
        let removed = self.anchors.lock().remove(anchor_id).is_some();
        tracing::debug!(anchor = %anchor_id, removed, "anchor unregistered");
        self.bus.emit(TourEvent::AnchorUnregister(anchor_id.to_string()));
    }

    pub fn resolve(&self, anchor_id: &str) -> Option<Arc<dyn TourAnchor>> {
        self.anchors.lock().get(anchor_id).cloned()
    }

    pub fn contains(&self, anchor_id: &str) -> bool {
        self.anchors.lock().contains_key(anchor_id)
    }

    pub fn len(&self) -> usize {
        self.anchors.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.lock().is_empty()
    }

    /// 已注册的锚点ID（排序后）
    pub fn ids(&self) -> Vec<AnchorId> {
        let mut ids: Vec<AnchorId> = self.anchors.lock().keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::EventKind;

    struct NoopAnchor;

    impl TourAnchor for NoopAnchor {
        fn show_step(&self, _step: &Step) {}
        fn hide_step(&self) {}
    }

    fn registry() -> (AnchorRegistry, Arc<Mutex<Vec<TourEvent>>>) {
        let bus = Arc::new(EventBus::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        bus.subscribe_all(move |event| sink.lock().push(event.clone()));
        (AnchorRegistry::new(bus), seen)
    }

    #[test]
    fn duplicate_registration_fails() {
        let (registry, _) = registry();
        registry.register("x", Arc::new(NoopAnchor)).unwrap();
        let err = registry.register("x", Arc::new(NoopAnchor)).unwrap_err();
        assert!(matches!(err, TourError::DuplicateAnchor(id) if id == "x"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn reregister_after_unregister_succeeds() {
        let (registry, seen) = registry();
        registry.register("x", Arc::new(NoopAnchor)).unwrap();
        registry.unregister("x");
        assert!(registry.resolve("x").is_none());
        registry.register("x", Arc::new(NoopAnchor)).unwrap();

        let kinds: Vec<EventKind> = seen.lock().iter().map(TourEvent::kind).collect();
        assert_eq!(
            kinds,
            vec![EventKind::AnchorRegister, EventKind::AnchorUnregister, EventKind::AnchorRegister]
        );
    }

    #[test]
    fn unregister_unknown_id_still_emits() {
        let (registry, seen) = registry();
        registry.unregister("ghost");
        assert_eq!(*seen.lock(), vec![TourEvent::AnchorUnregister("ghost".into())]);
        assert!(registry.is_empty());
    }
}
