//! 键盘映射
//!
//! | 按键 | 动作 |
//! |---|---|
//! | Escape | `end()` |
//! | ArrowRight | `next()`（仅当 `has_next`） |
//! | ArrowLeft | `prev()`（仅当 `has_prev`） |
//!
//! 只在导览状态为 `On` 时生效。

use super::router::Router;
use super::runtime::TourMachine;
use super::types::TourStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TourKey {
    Escape,
    ArrowRight,
    ArrowLeft,
}

impl TourKey {
    /// 按 DOM 键名解析
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name {
            "Escape" | "Esc" => Some(Self::Escape),
            "ArrowRight" | "Right" => Some(Self::ArrowRight),
            "ArrowLeft" | "Left" => Some(Self::ArrowLeft),
            _ => None,
        }
    }
}

/// 处理按键，返回是否执行了动作
pub async fn handle_key<R: Router>(tour: &TourMachine<R>, key: TourKey) -> bool {
    if tour.status() != TourStatus::On {
        return false;
    }
    match key {
        TourKey::Escape => {
            tour.end();
            true
        }
        TourKey::ArrowRight => {
            if !tour.has_next(tour.current_step().as_ref()) {
                return false;
            }
            tour.next().await;
            true
        }
        TourKey::ArrowLeft => {
            if !tour.has_prev(tour.current_step().as_ref()) {
                return false;
            }
            tour.prev().await;
            true
        }
    }
}
