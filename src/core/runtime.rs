//! 运行时导览状态机
//!
//! 持有导览状态（状态、目录、当前步骤），驱动步骤切换、导航同步和锚点调用，
//! 并通过事件总线发出生命周期事件。
//!
//! 内部锁从不跨越 `.await`，也不会在调用锚点或事件处理函数时持有。

use std::sync::{Arc, Weak};

use futures_util::Stream;
use futures_util::future::{self, BoxFuture, FutureExt};
use parking_lot::Mutex;

use super::anchor::{AnchorRegistry, TourAnchor};
use super::blueprint::TourBlueprint;
use super::bus::EventBus;
use super::catalog::StepCatalog;
use super::error::Result;
use super::event::{EventKind, TourEvent};
use super::guard::NavigationGuard;
use super::router::Router;
use super::step::{Route, Step, StepDefaults};
use super::types::{AnchorId, StepRef, SubscriptionId, TourStatus};

/// 导览状态
#[derive(Default)]
struct TourState {
    status: TourStatus,
    catalog: StepCatalog,
    current_step: Option<Arc<Step>>,
    /// 当前步骤是否正由锚点显示
    visible: bool,
    /// 每次提交步骤或结束导览时递增，用于让过期的守卫失效
    generation: u64,
    /// 每次结束导览或重新加载目录时递增，用于丢弃等待导航的切换
    epoch: u64,
}

struct Shared {
    state: Mutex<TourState>,
    /// 串行化提交与守卫隐藏，保证旧步骤的隐藏先于新步骤的显示；从不跨越 `.await`
    presentation: Mutex<()>,
    anchors: AnchorRegistry,
    bus: Arc<EventBus>,
    guard: NavigationGuard,
}

/// 尚未完成的步骤切换：导航已发起，等待结果后再提交
struct PendingTransition {
    step: Arc<Step>,
    navigation: BoxFuture<'static, bool>,
    epoch: u64,
}

/// 导览状态机
pub struct TourMachine<R: Router> {
    shared: Arc<Shared>,
    router: Arc<R>,
}

impl<R: Router> Clone for TourMachine<R> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            router: Arc::clone(&self.router),
        }
    }
}

impl<R: Router> TourMachine<R> {
    pub fn new(router: R) -> Self {
        Self::with_router(Arc::new(router))
    }

    pub fn with_router(router: Arc<R>) -> Self {
        let bus = Arc::new(EventBus::new());
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(TourState::default()),
                presentation: Mutex::new(()),
                anchors: AnchorRegistry::new(Arc::clone(&bus)),
                bus,
                guard: NavigationGuard::new(),
            }),
            router,
        }
    }

    // ---- 目录 ----

    /// 加载步骤目录
    ///
    /// `steps` 为空时什么都不做。否则替换目录、把状态重置为 `Off` 并发出 `initialize`。
    /// 若有正在显示的步骤，会先把它隐藏并清除。
    pub fn initialize(&self, steps: Vec<Step>, defaults: Option<&StepDefaults>) {
        let (loaded, previous) = {
            let mut state = self.shared.state.lock();
            let Some(loaded) = state.catalog.load(steps, defaults) else {
                return;
            };
            state.status = TourStatus::Off;
            state.epoch += 1;
            state.generation += 1;
            let previous = take_visible(&mut state);
            state.current_step = None;
            (loaded, previous)
        };
        self.shared.guard.disarm();
        tracing::debug!(steps = loaded.len(), "tour initialized");

        if let Some(previous) = previous {
            self.shared.hide_with_anchor(&previous);
        }
        self.shared.bus.emit(TourEvent::Initialize(loaded));
    }

    /// 从蓝图加载
    pub fn initialize_from(&self, blueprint: &TourBlueprint) {
        self.initialize(blueprint.steps.clone(), blueprint.defaults.as_ref());
    }

    // ---- 生命周期 ----

    pub async fn start(&self) {
        self.start_at(StepRef::Index(0)).await;
    }

    /// 从指定步骤开始导览
    pub async fn start_at(&self, step_ref: impl Into<StepRef>) {
        let step_ref = step_ref.into();
        let step = {
            let mut state = self.shared.state.lock();
            state.status = TourStatus::On;
            state.catalog.resolve(&step_ref)
        };
        tracing::debug!(step = %step_ref, "tour start");

        let pending = self.begin_transition(step);
        self.shared.bus.emit(TourEvent::Start);
        if let Some(pending) = pending {
            self.arm_guard();
            self.complete_transition(pending).await;
        }
    }

    /// 结束导览；没有当前步骤时同样发出 `end`
    pub fn end(&self) {
        self.shared.end();
    }

    /// 暂停：隐藏当前步骤但保留位置
    pub fn pause(&self) {
        let hidden = {
            let mut state = self.shared.state.lock();
            state.status = TourStatus::Paused;
            take_visible(&mut state)
        };
        tracing::debug!("tour paused");
        if let Some(step) = hidden {
            self.shared.hide_with_anchor(&step);
        }
        self.shared.bus.emit(TourEvent::Pause);
    }

    /// 恢复：重新显示保留的步骤
    ///
    /// 没有保留的步骤时导览会结束，但 `resume` 事件仍然发出。
    pub fn resume(&self) {
        let current = {
            let mut state = self.shared.state.lock();
            state.status = TourStatus::On;
            state.current_step.clone()
        };
        tracing::debug!("tour resumed");
        self.shared.show_step(current.as_ref());
        self.shared.bus.emit(TourEvent::Resume);
    }

    /// 切换：`pause_mode` 为真时在暂停/恢复之间切换，否则在开始/结束之间切换
    ///
    /// 暂停后步骤仍被保留，所以暂停模式按“正在运行且有步骤”判断，而不是只看有没有步骤。
    pub async fn toggle(&self, pause_mode: bool) {
        let (status, has_step) = {
            let state = self.shared.state.lock();
            (state.status, state.current_step.is_some())
        };
        if pause_mode {
            if status == TourStatus::On && has_step {
                self.pause();
            } else {
                self.resume();
            }
        } else if has_step {
            self.end();
        } else {
            self.start().await;
        }
    }

    // ---- 步骤导航 ----

    pub async fn next(&self) {
        let current = self.current_step();
        if !self.has_next(current.as_ref()) {
            return;
        }
        let target = {
            let state = self.shared.state.lock();
            current.and_then(|step| {
                let target = match &step.next_step {
                    Some(link) => link.clone(),
                    None => StepRef::Index(state.catalog.index_of(&step)? + 1),
                };
                state.catalog.resolve(&target)
            })
        };
        self.go_to_step(target).await;
    }

    pub async fn prev(&self) {
        let current = self.current_step();
        if !self.has_prev(current.as_ref()) {
            return;
        }
        let target = {
            let state = self.shared.state.lock();
            current.and_then(|step| {
                let target = match &step.prev_step {
                    Some(link) => link.clone(),
                    None => StepRef::Index(state.catalog.index_of(&step)?.checked_sub(1)?),
                };
                state.catalog.resolve(&target)
            })
        };
        self.go_to_step(target).await;
    }

    /// 是否存在下一步：显式链接，或不是目录中的最后一步
    pub fn has_next(&self, step: Option<&Arc<Step>>) -> bool {
        let Some(step) = step else {
            tracing::warn!("Can't get next step. No currentStep.");
            return false;
        };
        if step.next_step.is_some() {
            return true;
        }
        let state = self.shared.state.lock();
        state
            .catalog
            .index_of(step)
            .is_some_and(|index| index + 1 < state.catalog.len())
    }

    /// 是否存在上一步：显式链接，或不是目录中的第一步
    pub fn has_prev(&self, step: Option<&Arc<Step>>) -> bool {
        let Some(step) = step else {
            tracing::warn!("Can't get previous step. No currentStep.");
            return false;
        };
        if step.prev_step.is_some() {
            return true;
        }
        self.shared
            .state
            .lock()
            .catalog
            .index_of(step)
            .is_some_and(|index| index > 0)
    }

    /// 直接跳转到指定步骤，不需要先调用 `start`
    pub async fn goto(&self, step_ref: impl Into<StepRef>) {
        let step_ref = step_ref.into();
        let step = {
            let mut state = self.shared.state.lock();
            state.status = TourStatus::On;
            state.catalog.resolve(&step_ref)
        };
        tracing::debug!(step = %step_ref, "goto");
        self.go_to_step(step).await;
    }

    // ---- 锚点 ----

    pub fn register(&self, anchor_id: impl Into<AnchorId>, anchor: Arc<dyn TourAnchor>) -> Result<()> {
        self.shared.anchors.register(anchor_id, anchor)
    }

    pub fn unregister(&self, anchor_id: &str) {
        self.shared.anchors.unregister(anchor_id);
    }

    pub fn is_registered(&self, anchor_id: &str) -> bool {
        self.shared.anchors.contains(anchor_id)
    }

    pub fn anchors(&self) -> &AnchorRegistry {
        &self.shared.anchors
    }

    // ---- 查询与订阅 ----

    pub fn status(&self) -> TourStatus {
        self.shared.state.lock().status
    }

    pub fn current_step(&self) -> Option<Arc<Step>> {
        self.shared.state.lock().current_step.clone()
    }

    pub fn steps(&self) -> Arc<[Arc<Step>]> {
        self.shared.state.lock().catalog.steps()
    }

    pub fn router(&self) -> &Arc<R> {
        &self.router
    }

    pub fn bus(&self) -> &EventBus {
        &self.shared.bus
    }

    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&TourEvent) + Send + Sync + 'static,
    {
        self.shared.bus.subscribe(kind, handler)
    }

    /// 全部生命周期事件的合并流
    pub fn events(&self) -> impl Stream<Item = TourEvent> + Send + Unpin + 'static {
        self.shared.bus.stream()
    }

    // ---- 切换原语 ----

    async fn go_to_step(&self, step: Option<Arc<Step>>) {
        if let Some(pending) = self.begin_transition(step) {
            self.complete_transition(pending).await;
        }
    }

    /// 切换的同步部分：步骤不存在时结束导览，否则发起导航
    fn begin_transition(&self, step: Option<Arc<Step>>) -> Option<PendingTransition> {
        let Some(step) = step else {
            tracing::warn!("Can't go to non-existent step");
            self.end();
            return None;
        };

        let navigation = match &step.route {
            Some(Route::Url(url)) => self.router.navigate_by_url(url),
            Some(Route::Segments(segments)) => self.router.navigate(segments),
            None => future::ready(true).boxed(),
        };
        let epoch = self.shared.state.lock().epoch;
        Some(PendingTransition {
            step,
            navigation,
            epoch,
        })
    }

    /// 等待导航结果，让出一次调度，然后提交步骤
    async fn complete_transition(&self, pending: PendingTransition) {
        let PendingTransition {
            step,
            navigation,
            epoch,
        } = pending;

        if !navigation.await {
            tracing::debug!(step = %step.label(), "navigation cancelled; step not shown");
            return;
        }
        tokio::task::yield_now().await;

        if self.shared.state.lock().epoch != epoch {
            tracing::debug!(step = %step.label(), "tour ended during navigation; step dropped");
            return;
        }
        self.set_current_step(step);
    }

    /// 提交步骤：先隐藏旧步骤，再显示新步骤，然后重新布防导航守卫
    fn set_current_step(&self, step: Arc<Step>) {
        let presentation = self.shared.presentation.lock();
        let previous = {
            let mut state = self.shared.state.lock();
            state.generation += 1;
            let previous = take_visible(&mut state);
            state.current_step = Some(Arc::clone(&step));
            previous
        };
        if let Some(previous) = previous {
            self.shared.hide_with_anchor(&previous);
        }

        self.shared.show_step(Some(&step));
        drop(presentation);

        if self.shared.state.lock().status != TourStatus::Off {
            self.arm_guard();
        }
    }

    /// 布防一次性守卫：下一次导航开始时隐藏当前步骤
    fn arm_guard(&self) {
        let generation = self.shared.state.lock().generation;
        let shared: Weak<Shared> = Arc::downgrade(&self.shared);
        self.shared.guard.arm(self.router.events(), move || {
            if let Some(shared) = shared.upgrade() {
                shared.hide_for_navigation(generation);
            }
        });
    }
}

impl Shared {
    fn end(&self) {
        let hidden = {
            let mut state = self.state.lock();
            state.status = TourStatus::Off;
            state.generation += 1;
            state.epoch += 1;
            let hidden = take_visible(&mut state);
            state.current_step = None;
            hidden
        };
        self.guard.disarm();
        tracing::debug!("tour ended");

        if let Some(step) = hidden {
            self.hide_with_anchor(&step);
        }
        self.bus.emit(TourEvent::End);
    }

    /// 显示步骤；找不到锚点时结束导览
    fn show_step(&self, step: Option<&Arc<Step>>) {
        let Some((step, anchor)) =
            step.and_then(|step| self.anchors.resolve(&step.anchor_id).map(|anchor| (step, anchor)))
        else {
            if let Some(step) = step {
                tracing::warn!(step = %step.label(), "no anchor registered for step; ending tour");
            }
            self.end();
            return;
        };

        {
            let mut state = self.state.lock();
            if state
                .current_step
                .as_ref()
                .is_some_and(|current| Arc::ptr_eq(current, step))
            {
                state.visible = true;
            }
        }
        tracing::debug!(step = %step.label(), "show step");
        anchor.show_step(step);
        self.bus.emit(TourEvent::StepShow(Arc::clone(step)));
    }

    /// 隐藏已经从状态中取出的步骤；锚点已卸载时静默跳过
    fn hide_with_anchor(&self, step: &Arc<Step>) {
        let Some(anchor) = self.anchors.resolve(&step.anchor_id) else {
            tracing::debug!(step = %step.label(), "anchor gone; skipping hide");
            return;
        };
        tracing::debug!(step = %step.label(), "hide step");
        anchor.hide_step();
        self.bus.emit(TourEvent::StepHide(Arc::clone(step)));
    }

    /// 守卫回调：只在没有新的步骤提交时隐藏当前步骤，不会结束导览
    fn hide_for_navigation(&self, generation: u64) {
        let _presentation = self.presentation.lock();
        let hidden = {
            let mut state = self.state.lock();
            if state.generation != generation {
                return;
            }
            take_visible(&mut state)
        };
        if let Some(step) = hidden {
            tracing::debug!(step = %step.label(), "navigation started; hiding step");
            self.hide_with_anchor(&step);
        }
    }
}

/// 若当前步骤正在显示，标记为隐藏并返回它
fn take_visible(state: &mut TourState) -> Option<Arc<Step>> {
    if !state.visible {
        return None;
    }
    state.visible = false;
    state.current_step.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::router::MemoryRouter;

    #[derive(Default)]
    struct CountingAnchor {
        shown: Mutex<Vec<String>>,
        hides: Mutex<usize>,
    }

    impl TourAnchor for CountingAnchor {
        fn show_step(&self, step: &Step) {
            self.shown.lock().push(step.anchor_id.clone());
        }

        fn hide_step(&self) {
            *self.hides.lock() += 1;
        }
    }

    fn machine() -> (TourMachine<MemoryRouter>, Arc<CountingAnchor>) {
        let tour = TourMachine::new(MemoryRouter::default());
        let anchor = Arc::new(CountingAnchor::default());
        tour.register("x", Arc::clone(&anchor) as Arc<dyn TourAnchor>).unwrap();
        tour.register("y", Arc::clone(&anchor) as Arc<dyn TourAnchor>).unwrap();
        tour.initialize(
            vec![Step::new("x").with_id("a"), Step::new("y").with_id("b")],
            None,
        );
        (tour, anchor)
    }

    #[tokio::test]
    async fn start_shows_first_step() {
        let (tour, anchor) = machine();
        tour.start().await;

        assert_eq!(tour.status(), TourStatus::On);
        assert_eq!(*anchor.shown.lock(), vec!["x".to_string()]);
        assert_eq!(tour.current_step().unwrap().step_id.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn pause_keeps_position_and_resume_reshows() {
        let (tour, anchor) = machine();
        tour.start().await;
        tour.pause();

        assert_eq!(tour.status(), TourStatus::Paused);
        assert!(tour.current_step().is_some());
        assert_eq!(*anchor.hides.lock(), 1);

        tour.resume();
        assert_eq!(tour.status(), TourStatus::On);
        assert_eq!(*anchor.shown.lock(), vec!["x".to_string(), "x".to_string()]);
    }

    #[tokio::test]
    async fn end_after_pause_does_not_hide_twice() {
        let (tour, anchor) = machine();
        tour.start().await;
        tour.pause();
        tour.end();

        assert_eq!(*anchor.hides.lock(), 1);
        assert_eq!(tour.status(), TourStatus::Off);
        assert!(tour.current_step().is_none());
    }

    #[tokio::test]
    async fn resume_without_step_ends_tour() {
        let (tour, _) = machine();
        tour.resume();
        assert_eq!(tour.status(), TourStatus::Off);
    }

    #[tokio::test]
    async fn toggle_dispatches_on_current_step() {
        let (tour, _) = machine();

        tour.toggle(false).await;
        assert_eq!(tour.status(), TourStatus::On);
        tour.toggle(true).await;
        assert_eq!(tour.status(), TourStatus::Paused);
        tour.toggle(true).await;
        assert_eq!(tour.status(), TourStatus::On);
        tour.toggle(false).await;
        assert_eq!(tour.status(), TourStatus::Off);
    }

    #[tokio::test]
    async fn has_next_without_step_is_false() {
        let (tour, _) = machine();
        assert!(!tour.has_next(None));
        assert!(!tour.has_prev(None));
    }

    #[tokio::test]
    async fn explicit_link_to_first_step_is_honoured() {
        let tour = TourMachine::new(MemoryRouter::default());
        let anchor = Arc::new(CountingAnchor::default());
        for id in ["x", "y", "z"] {
            tour.register(id, Arc::clone(&anchor) as Arc<dyn TourAnchor>).unwrap();
        }
        tour.initialize(
            vec![Step::new("x"), Step::new("y").with_next(StepRef::Index(0)), Step::new("z")],
            None,
        );

        tour.start_at(StepRef::Index(1)).await;
        tour.next().await;

        assert_eq!(tour.current_step().unwrap().anchor_id, "x");
    }

    #[tokio::test]
    async fn initialize_clears_running_tour() {
        let (tour, anchor) = machine();
        tour.start().await;
        tour.initialize(vec![Step::new("y")], None);

        assert_eq!(tour.status(), TourStatus::Off);
        assert!(tour.current_step().is_none());
        assert_eq!(*anchor.hides.lock(), 1);
        assert_eq!(tour.steps().len(), 1);
    }
}
