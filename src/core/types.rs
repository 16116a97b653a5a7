//! 类型别名和基础类型定义

use std::fmt;

use serde::{Deserialize, Serialize};

/// 锚点ID
pub type AnchorId = String;

/// 订阅ID
pub type SubscriptionId = u64;

/// 导览状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TourStatus {
    /// 未运行（初始状态，也是两次导览之间的状态）
    #[default]
    Off,
    /// 运行中：有一个步骤处于激活或切换状态
    On,
    /// 暂停：步骤被隐藏，但保留当前位置
    Paused,
}

impl TourStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::On => "ON",
            Self::Paused => "PAUSED",
        }
    }
}

impl fmt::Display for TourStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 步骤引用
///
/// 数字表示目录中的位置，字符串表示按 `step_id` 查找。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepRef {
    /// 按位置
    Index(usize),
    /// 按 `step_id`
    Id(String),
}

impl From<usize> for StepRef {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for StepRef {
    fn from(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

impl From<String> for StepRef {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

impl fmt::Display for StepRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "#{index}"),
            Self::Id(id) => write!(f, "{id:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_ref_deserializes_numbers_as_positions() {
        let refs: Vec<StepRef> = serde_json::from_str(r#"[2, "intro"]"#).unwrap();
        assert_eq!(refs, vec![StepRef::Index(2), StepRef::Id("intro".into())]);
    }

    #[test]
    fn status_defaults_to_off() {
        assert_eq!(TourStatus::default(), TourStatus::Off);
        assert_eq!(TourStatus::Paused.to_string(), "PAUSED");
    }
}
