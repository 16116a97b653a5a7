//! 导览蓝图
//!
//! 声明式的导览定义，可以从 TOML 或 JSON 加载：
//!
//! ```toml
//! [defaults]
//! nextBtnTitle = "Next"
//!
//! [[steps]]
//! stepId = "welcome"
//! anchorId = "header"
//! route = "/home"
//! title = "Welcome"
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{Result, TourError};
use super::step::{Step, StepDefaults};
use super::types::StepRef;
use crate::utils::tool::STEP_IDENTITY_KEYS;

/// 导览蓝图：默认值加有序步骤
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TourBlueprint {
    /// 步骤默认值
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<StepDefaults>,
    /// 有序步骤
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl TourBlueprint {
    /// 创建一个新的空蓝图
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// 从文件加载，按扩展名选择格式（`.toml` 或 `.json`）
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| TourError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let blueprint = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&source)?,
            Some("json") => Self::from_json_str(&source)?,
            _ => return Err(TourError::UnsupportedFormat(path.to_path_buf())),
        };
        tracing::debug!(path = %path.display(), steps = blueprint.steps.len(), "loaded tour blueprint");
        Ok(blueprint)
    }

    /// 合并两个蓝图
    ///
    /// 步骤按顺序拼接；默认值逐字段合并，`other` 优先。
    pub fn merge(&self, other: &Self) -> Self {
        let defaults = match (&self.defaults, &other.defaults) {
            (Some(base), Some(over)) => Some(base.overridden_by(over)),
            (base, over) => over.clone().or_else(|| base.clone()),
        };
        let mut steps = self.steps.clone();
        steps.extend(other.steps.iter().cloned());

        Self { defaults, steps }
    }

    /// 检查 `stepId` 是否唯一，以及 `nextStep`/`prevStep` 是否都能解析
    ///
    /// 默认值里出现标识或链接字段也视为错误。
    pub fn validate(&self) -> Result<()> {
        if let Some(defaults) = &self.defaults {
            if let Some(key) = STEP_IDENTITY_KEYS.iter().find(|key| defaults.extra.contains_key(**key)) {
                return Err(TourError::NonDefaultableField((*key).to_string()));
            }
        }

        let mut seen = HashSet::new();
        for id in self.steps.iter().filter_map(|step| step.step_id.as_deref()) {
            if !seen.insert(id) {
                return Err(TourError::DuplicateStepId(id.to_string()));
            }
        }

        for (index, step) in self.steps.iter().enumerate() {
            for target in [&step.next_step, &step.prev_step].into_iter().flatten() {
                if !self.resolves(target) {
                    let step_ref = match &step.step_id {
                        Some(id) => StepRef::Id(id.clone()),
                        None => StepRef::Index(index),
                    };
                    return Err(TourError::DanglingStepRef {
                        step: step_ref,
                        target: target.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn resolves(&self, target: &StepRef) -> bool {
        match target {
            StepRef::Index(index) => *index < self.steps.len(),
            StepRef::Id(id) => has_step_id(&self.steps, id),
        }
    }
}

fn has_step_id(steps: &[Step], id: &str) -> bool {
    steps.iter().any(|step| step.step_id.as_deref() == Some(id))
}
