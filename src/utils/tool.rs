//! 工具函数

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawStepId {
    Text(String),
    Integer(i64),
    Float(f64),
}

/// 反序列化 `stepId`，数字会转换成十进制文本
pub fn deserialize_step_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawStepId>::deserialize(deserializer)?;
    Ok(raw.map(|id| match id {
        RawStepId::Text(text) => text,
        RawStepId::Integer(n) => n.to_string(),
        RawStepId::Float(n) => n.to_string(),
    }))
}

/// 标识和链接字段，不能作为默认值
pub const STEP_IDENTITY_KEYS: [&str; 4] = ["stepId", "anchorId", "nextStep", "prevStep"];

/// 合并两个字段表
///
/// 先取 `defaults` 中除 [`STEP_IDENTITY_KEYS`] 以外的键，再用 `overrides` 中的同名键覆盖。
pub fn merge_extra(defaults: &Map<String, Value>, overrides: Map<String, Value>) -> Map<String, Value> {
    let mut merged: Map<String, Value> = defaults
        .iter()
        .filter(|(key, _)| !STEP_IDENTITY_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    merged.extend(overrides);
    merged
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn overrides_replace_default_keys() {
        let defaults = json!({"a": 1, "b": 2}).as_object().cloned().unwrap();
        let overrides = json!({"b": 3, "c": 4}).as_object().cloned().unwrap();
        let merged = merge_extra(&defaults, overrides);
        assert_eq!(Value::Object(merged), json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn identity_keys_never_leak_from_defaults() {
        let defaults = json!({"nextStep": "b", "prevStep": 0, "stepId": "x", "anchorId": "y", "placement": "top"})
            .as_object()
            .cloned()
            .unwrap();
        let merged = merge_extra(&defaults, Map::new());
        assert_eq!(Value::Object(merged), json!({"placement": "top"}));
    }
}
