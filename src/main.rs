use std::path::PathBuf;

use log::{error, info, warn};
use tokio_util::sync::CancellationToken;

use memalert::{Config, DiscordNotifier, Monitor, SystemSampler};

#[tokio::main]
async fn main() {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(Config::default_path)
        .expect("No config path given and no user config directory found");
    let config = Config::load(&path).expect("Failed to load configuration");

    if config.discord.discord_id.is_some() {
        info!("Discord ID is set, warnings will tag the user");
    } else {
        warn!("Discord ID is not set, warnings will not tag any user");
    }

    let notifier = DiscordNotifier::new(
        config.discord.webhook_url.clone(),
        config.discord.discord_id,
    );
    let monitor = Monitor::new(&config.monitor, SystemSampler::new(), notifier);

    let token = CancellationToken::new();
    let worker = tokio::spawn(monitor.run(token.clone()));

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
    }
    info!("Shutdown requested");
    token.cancel();
    if let Err(e) = worker.await {
        error!("Monitor task failed: {e}");
    }
}
