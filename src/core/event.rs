//! 生命周期事件定义

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::step::Step;
use super::types::AnchorId;

/// 事件通道
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    StepShow,
    StepHide,
    Initialize,
    Start,
    End,
    Pause,
    Resume,
    AnchorRegister,
    AnchorUnregister,
}

impl EventKind {
    /// 全部通道，按固定顺序
    pub const ALL: [EventKind; 9] = [
        Self::StepShow,
        Self::StepHide,
        Self::Initialize,
        Self::Start,
        Self::End,
        Self::Pause,
        Self::Resume,
        Self::AnchorRegister,
        Self::AnchorUnregister,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StepShow => "stepShow",
            Self::StepHide => "stepHide",
            Self::Initialize => "initialize",
            Self::Start => "start",
            Self::End => "end",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::AnchorRegister => "anchorRegister",
            Self::AnchorUnregister => "anchorUnregister",
        }
    }

    /// 从通道名解析，例如 `"stepShow"`
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 带标签的生命周期事件
#[derive(Debug, Clone, PartialEq)]
pub enum TourEvent {
    StepShow(Arc<Step>),
    StepHide(Arc<Step>),
    Initialize(Arc<[Arc<Step>]>),
    Start,
    End,
    Pause,
    Resume,
    AnchorRegister(AnchorId),
    AnchorUnregister(AnchorId),
}

impl TourEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::StepShow(_) => EventKind::StepShow,
            Self::StepHide(_) => EventKind::StepHide,
            Self::Initialize(_) => EventKind::Initialize,
            Self::Start => EventKind::Start,
            Self::End => EventKind::End,
            Self::Pause => EventKind::Pause,
            Self::Resume => EventKind::Resume,
            Self::AnchorRegister(_) => EventKind::AnchorRegister,
            Self::AnchorUnregister(_) => EventKind::AnchorUnregister,
        }
    }

    /// 事件关联的步骤（仅 show/hide 事件）
    pub fn step(&self) -> Option<&Arc<Step>> {
        match self {
            Self::StepShow(step) | Self::StepHide(step) => Some(step),
            _ => None,
        }
    }
}
