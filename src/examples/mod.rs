//! 示例

pub mod onboarding_tour;
