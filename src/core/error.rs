//! 错误类型

use std::path::PathBuf;

use thiserror::Error;

use super::types::{AnchorId, StepRef};

/// 导览错误
///
/// 只有使用错误（重复注册锚点）和蓝图加载错误会返回给调用者，
/// 步骤与锚点解析失败都在状态机内部吸收。
#[derive(Debug, Error)]
pub enum TourError {
    #[error("anchorId {0} already registered!")]
    DuplicateAnchor(AnchorId),

    #[error("failed to read tour blueprint {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML tour blueprint: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON tour blueprint: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported tour blueprint format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("stepId {0} is used by more than one step")]
    DuplicateStepId(String),

    #[error("step {step} links to {target}, which does not exist")]
    DanglingStepRef { step: StepRef, target: StepRef },

    #[error("field {0} cannot be set in step defaults")]
    NonDefaultableField(String),
}

pub type Result<T> = std::result::Result<T, TourError>;
