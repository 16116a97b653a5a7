//! 步骤目录

use std::sync::Arc;

use super::step::{Step, StepDefaults};
use super::types::StepRef;

/// 有序的步骤集合
#[derive(Debug, Clone, Default)]
pub struct StepCatalog {
    steps: Arc<[Arc<Step>]>,
}

impl StepCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加载步骤
    ///
    /// `steps` 为空时不做任何修改并返回 `None`；否则把每个步骤合并到
    /// `defaults` 之上，整体替换目录，并返回新的步骤序列。
    pub fn load(&mut self, steps: Vec<Step>, defaults: Option<&StepDefaults>) -> Option<Arc<[Arc<Step>]>> {
        if steps.is_empty() {
            return None;
        }
        let steps: Arc<[Arc<Step>]> = steps
            .into_iter()
            .map(|step| match defaults {
                Some(defaults) => step.merged_over(defaults),
                None => step,
            })
            .map(Arc::new)
            .collect();
        self.steps = Arc::clone(&steps);
        Some(steps)
    }

    pub fn steps(&self) -> Arc<[Arc<Step>]> {
        Arc::clone(&self.steps)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn find_by_id(&self, step_id: &str) -> Option<Arc<Step>> {
        self.steps
            .iter()
            .find(|step| step.step_id.as_deref() == Some(step_id))
            .cloned()
    }

    pub fn find_by_index(&self, index: usize) -> Option<Arc<Step>> {
        self.steps.get(index).cloned()
    }

    /// 按身份（指针）查找位置
    pub fn index_of(&self, step: &Arc<Step>) -> Option<usize> {
        self.steps.iter().position(|s| Arc::ptr_eq(s, step))
    }

    pub fn resolve(&self, step_ref: &StepRef) -> Option<Arc<Step>> {
        match step_ref {
            StepRef::Index(index) => self.find_by_index(*index),
            StepRef::Id(id) => self.find_by_id(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> StepCatalog {
        let mut catalog = StepCatalog::new();
        catalog.load(
            vec![Step::new("x").with_id("a"), Step::new("y").with_id("b")],
            None,
        );
        catalog
    }

    #[test]
    fn empty_load_keeps_previous_steps() {
        let mut catalog = catalog();
        assert!(catalog.load(Vec::new(), None).is_none());
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn load_applies_defaults_in_order() {
        let mut catalog = StepCatalog::new();
        let defaults = StepDefaults {
            title: Some("Default".into()),
            ..StepDefaults::default()
        };
        let loaded = catalog
            .load(
                vec![Step::new("x"), Step::new("y").with_title("Own")],
                Some(&defaults),
            )
            .unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].anchor_id, "x");
        assert_eq!(loaded[0].title.as_deref(), Some("Default"));
        assert_eq!(loaded[1].title.as_deref(), Some("Own"));
    }

    #[test]
    fn resolve_by_index_and_id() {
        let catalog = catalog();
        assert_eq!(catalog.resolve(&StepRef::Index(1)).unwrap().anchor_id, "y");
        assert_eq!(catalog.resolve(&"a".into()).unwrap().anchor_id, "x");
        assert!(catalog.resolve(&StepRef::Index(5)).is_none());
        assert!(catalog.resolve(&"missing".into()).is_none());
    }

    #[test]
    fn index_of_uses_identity() {
        let catalog = catalog();
        let b = catalog.find_by_id("b").unwrap();
        assert_eq!(catalog.index_of(&b), Some(1));

        let lookalike = Arc::new((*b).clone());
        assert_eq!(catalog.index_of(&lookalike), None);
    }
}
