//! 核心导览状态机模块

// 子模块
pub mod types;
pub mod error;
pub mod step;
pub mod catalog;
pub mod event;
pub mod bus;
pub mod anchor;
pub mod router;
pub mod guard;
pub mod blueprint;
pub mod runtime;
pub mod hotkeys;

// 重新导出常用类型
pub use types::*;
pub use error::{Result, TourError};
pub use step::{Route, Step, StepDefaults};
pub use catalog::StepCatalog;
pub use event::{EventKind, TourEvent};
pub use bus::{EventBus, EventHandler};
pub use anchor::{AnchorRegistry, TourAnchor};
pub use router::{MemoryRouter, NavigationEvent, Router};
pub use guard::NavigationGuard;
pub use blueprint::TourBlueprint;
pub use runtime::TourMachine;
pub use hotkeys::{handle_key, TourKey};
