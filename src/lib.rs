//! Tour-Zen: 导览编排状态机
//!
//! 在应用页面上叠加多步骤引导：跟踪当前步骤，让步骤的显示与页面导航同步，
//! 并把生命周期变化通知给订阅者。路由和锚点渲染只通过 [`Router`] 与
//! [`TourAnchor`] 两个 trait 接入。

// 导出核心模块
pub mod core;
pub mod utils;
pub mod examples;

// 重新导出常用类型，方便用户使用
pub use crate::core::{
    AnchorId, StepRef, SubscriptionId, TourStatus,
    Step, StepDefaults, Route, StepCatalog,
    EventKind, TourEvent, EventBus,
    AnchorRegistry, TourAnchor,
    MemoryRouter, NavigationEvent, Router,
    TourBlueprint, TourMachine, TourKey, handle_key,
    Result, TourError,
};
