//! Memory usage monitor that warns through a Discord webhook.
//!
//! Samples system memory on a fixed interval and sends a warning the moment
//! usage crosses the configured limit. While usage stays over the limit, an
//! optional repeat timer re-sends the warning at its own cadence; dropping
//! back under the limit stops it.

pub mod config;
pub mod error;
pub mod monitor;
pub mod notifier;
pub mod sampler;

pub use config::Config;
pub use error::Error;
pub use monitor::{Monitor, Phase, render_message};
pub use notifier::{DiscordNotifier, Notifier};
pub use sampler::{Sampler, SystemSampler};
