//! 新用户引导示例
//! 演示如何把导览状态机接到内存路由和打印型锚点上

use std::sync::Arc;

use futures_util::{FutureExt, StreamExt};

use crate::core::{
    MemoryRouter, Step, StepDefaults, TourAnchor, TourBlueprint, TourMachine,
};
use crate::core::error::Result;

/// 把步骤打印到终端的锚点
pub struct PrintAnchor {
    name: String,
}

impl PrintAnchor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl TourAnchor for PrintAnchor {
    fn show_step(&self, step: &Step) {
        println!(
            "  [{}] {} - {}",
            self.name,
            step.title.as_deref().unwrap_or("(untitled)"),
            step.content.as_deref().unwrap_or("")
        );
    }

    fn hide_step(&self) {
        println!("  [{}] hidden", self.name);
    }
}

/// 内置的示例导览
pub fn default_blueprint() -> TourBlueprint {
    TourBlueprint {
        defaults: Some(StepDefaults {
            next_btn_title: Some("Next".into()),
            prev_btn_title: Some("Back".into()),
            end_btn_title: Some("Done".into()),
            ..StepDefaults::default()
        }),
        steps: vec![
            Step::new("header")
                .with_id("welcome")
                .with_route("/home")
                .with_title("Welcome")
                .with_content("This is your dashboard."),
            Step::new("sidebar")
                .with_id("navigation")
                .with_title("Navigation")
                .with_content("Everything lives in the sidebar."),
            Step::new("profile")
                .with_id("profile")
                .with_route(vec!["settings".to_string(), "profile".to_string()])
                .with_title("Your profile")
                .with_content("Update your details here."),
        ],
    }
}

/// 创建示例导览：注册蓝图中用到的全部锚点并加载步骤
pub fn create_onboarding_tour(blueprint: &TourBlueprint) -> Result<TourMachine<MemoryRouter>> {
    let tour = TourMachine::new(MemoryRouter::default());

    let mut anchor_ids: Vec<&str> = blueprint.steps.iter().map(|s| s.anchor_id.as_str()).collect();
    anchor_ids.sort_unstable();
    anchor_ids.dedup();
    for anchor_id in anchor_ids {
        tour.register(anchor_id, Arc::new(PrintAnchor::new(anchor_id)))?;
    }

    tour.initialize_from(blueprint);
    Ok(tour)
}

/// 运行示例导览：从头走到尾，再退回一步，最后结束
pub async fn run_onboarding_tour_example(blueprint: &TourBlueprint) -> Result<()> {
    println!("=== 新用户引导示例 ===");

    let tour = create_onboarding_tour(blueprint)?;
    let mut events = tour.events();
    let router = Arc::clone(tour.router());

    tour.start().await;
    while tour.has_next(tour.current_step().as_ref()) {
        tour.next().await;
    }
    tour.prev().await;
    tour.end();

    println!("最终状态: {}", tour.status());
    println!("最终路径: {}", router.current_url());
    println!("事件序列:");
    while let Some(event) = events.next().now_or_never().flatten() {
        match event.step() {
            Some(step) => println!("  {} {}", event.kind(), step.label()),
            None => println!("  {}", event.kind()),
        }
    }

    println!("=== 示例结束 ===\n");
    Ok(())
}
