//! 步骤定义

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::types::{AnchorId, StepRef};
use crate::utils::tool::{deserialize_step_id, merge_extra};

/// 导航目标
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Route {
    /// 完整路径，例如 `/settings/profile`
    Url(String),
    /// 结构化路由片段，例如 `["settings", "profile"]`
    Segments(Vec<String>),
}

impl From<&str> for Route {
    fn from(url: &str) -> Self {
        Self::Url(url.to_string())
    }
}

impl From<Vec<String>> for Route {
    fn from(segments: Vec<String>) -> Self {
        Self::Segments(segments)
    }
}

/// 导览中的一个步骤
///
/// 加载后以 `Arc<Step>` 保存，之后不再修改；步骤的身份按指针判断。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// 可选的稳定标识符，接受字符串或数字
    #[serde(
        default,
        deserialize_with = "deserialize_step_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub step_id: Option<String>,
    /// 负责显示该步骤的锚点
    pub anchor_id: AnchorId,
    /// 显示前需要导航到的位置
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<Route>,
    /// 显式指定的下一步
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_step: Option<StepRef>,
    /// 显式指定的上一步
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_step: Option<StepRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_btn_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_btn_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_btn_title: Option<String>,
    /// 其他展示字段，原样交给锚点
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Step {
    /// 创建一个只绑定锚点的步骤
    pub fn new(anchor_id: impl Into<AnchorId>) -> Self {
        Self {
            step_id: None,
            anchor_id: anchor_id.into(),
            route: None,
            next_step: None,
            prev_step: None,
            title: None,
            content: None,
            prev_btn_title: None,
            next_btn_title: None,
            end_btn_title: None,
            extra: Map::new(),
        }
    }

    pub fn with_id(mut self, step_id: impl Into<String>) -> Self {
        self.step_id = Some(step_id.into());
        self
    }

    pub fn with_route(mut self, route: impl Into<Route>) -> Self {
        self.route = Some(route.into());
        self
    }

    pub fn with_next(mut self, next: impl Into<StepRef>) -> Self {
        self.next_step = Some(next.into());
        self
    }

    pub fn with_prev(mut self, prev: impl Into<StepRef>) -> Self {
        self.prev_step = Some(prev.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// 将步骤合并到默认值之上，冲突时以步骤自身的值为准
    pub fn merged_over(self, defaults: &StepDefaults) -> Self {
        Self {
            route: self.route.or_else(|| defaults.route.clone()),
            title: self.title.or_else(|| defaults.title.clone()),
            content: self.content.or_else(|| defaults.content.clone()),
            prev_btn_title: self.prev_btn_title.or_else(|| defaults.prev_btn_title.clone()),
            next_btn_title: self.next_btn_title.or_else(|| defaults.next_btn_title.clone()),
            end_btn_title: self.end_btn_title.or_else(|| defaults.end_btn_title.clone()),
            extra: merge_extra(&defaults.extra, self.extra),
            ..self
        }
    }

    /// 用于日志的简短标签
    pub fn label(&self) -> String {
        match &self.step_id {
            Some(id) => format!("{id}@{}", self.anchor_id),
            None => format!("@{}", self.anchor_id),
        }
    }
}

/// 步骤默认值
///
/// 只包含展示相关字段；身份与链接字段（`stepId`、`anchorId`、`nextStep`、`prevStep`）不能设默认值。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<Route>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_btn_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_btn_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_btn_title: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StepDefaults {
    /// 逐字段覆盖，`other` 中设置的值优先
    pub fn overridden_by(&self, other: &Self) -> Self {
        Self {
            route: other.route.clone().or_else(|| self.route.clone()),
            title: other.title.clone().or_else(|| self.title.clone()),
            content: other.content.clone().or_else(|| self.content.clone()),
            prev_btn_title: other.prev_btn_title.clone().or_else(|| self.prev_btn_title.clone()),
            next_btn_title: other.next_btn_title.clone().or_else(|| self.next_btn_title.clone()),
            end_btn_title: other.end_btn_title.clone().or_else(|| self.end_btn_title.clone()),
            extra: merge_extra(&self.extra, other.extra.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn step_values_win_over_defaults() {
        let defaults: StepDefaults = serde_json::from_value(json!({
            "title": "Tour",
            "nextBtnTitle": "Next",
            "placement": "below",
            "enableBackdrop": true
        }))
        .unwrap();
        let step: Step = serde_json::from_value(json!({
            "anchorId": "x",
            "title": "Welcome",
            "placement": "above"
        }))
        .unwrap();

        let merged = step.merged_over(&defaults);
        assert_eq!(merged.title.as_deref(), Some("Welcome"));
        assert_eq!(merged.next_btn_title.as_deref(), Some("Next"));
        assert_eq!(merged.extra["placement"], json!("above"));
        assert_eq!(merged.extra["enableBackdrop"], json!(true));
    }

    #[test]
    fn defaults_cannot_relink_steps() {
        let defaults: StepDefaults = serde_json::from_value(json!({
            "nextStep": "elsewhere",
            "prevStep": 3,
            "anchorId": "other",
            "placement": "below"
        }))
        .unwrap();
        let step = Step::new("x").with_id("a");

        let merged = step.merged_over(&defaults);
        assert_eq!(merged.anchor_id, "x");
        assert_eq!(merged.next_step, None);
        assert_eq!(merged.prev_step, None);
        assert!(!merged.extra.contains_key("nextStep"));
        assert!(!merged.extra.contains_key("anchorId"));
        assert_eq!(merged.extra["placement"], json!("below"));
    }

    #[test]
    fn numeric_step_id_is_kept_as_text() {
        let step: Step = serde_json::from_value(json!({"stepId": 7, "anchorId": "x"})).unwrap();
        assert_eq!(step.step_id.as_deref(), Some("7"));
    }

    #[test]
    fn route_accepts_path_or_segments() {
        let by_url: Step =
            serde_json::from_value(json!({"anchorId": "x", "route": "/home"})).unwrap();
        let by_segments: Step =
            serde_json::from_value(json!({"anchorId": "x", "route": ["users", "42"]})).unwrap();
        assert_eq!(by_url.route, Some(Route::Url("/home".into())));
        assert_eq!(
            by_segments.route,
            Some(Route::Segments(vec!["users".into(), "42".into()]))
        );
    }
}
