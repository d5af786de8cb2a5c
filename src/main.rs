// Falsebound: a small 3D field game

// Module declarations
mod app;
mod renderer;

use falsebound::config::GameConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::init();

    let config = GameConfig::from_env()?;
    app::run(config).await
}
