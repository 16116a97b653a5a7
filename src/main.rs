//! Tour-Zen 示例程序
//!
//! 不带参数时运行内置导览；也可以传入 `.toml` 或 `.json` 蓝图文件。

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tour_zen::TourBlueprint;
use tour_zen::examples::onboarding_tour;

#[derive(Parser)]
#[command(name = "tour-zen", about = "Run a guided tour against an in-memory router")]
struct Cli {
    /// 导览蓝图文件（.toml 或 .json）
    blueprint: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let blueprint = match &cli.blueprint {
        Some(path) => {
            let blueprint = TourBlueprint::load(path)
                .with_context(|| format!("loading {}", path.display()))?;
            blueprint.validate().context("invalid tour blueprint")?;
            blueprint
        }
        None => onboarding_tour::default_blueprint(),
    };

    println!("Tour-Zen 导览示例");
    println!("================\n");

    onboarding_tour::run_onboarding_tour_example(&blueprint).await?;

    println!("所有示例运行完成！");
    Ok(())
}
