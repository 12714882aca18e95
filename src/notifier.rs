use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::error::Error;

/// Delivers a rendered warning to the preconfigured recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, text: &str) -> Result<(), Error>;
}

#[derive(Serialize)]
struct DiscordMessage {
    content: String,
}

/// Sends warnings to a Discord webhook, optionally tagging a user.
#[derive(Debug, Clone)]
pub struct DiscordNotifier {
    client: Client,
    webhook_url: String,
    discord_id: Option<u64>,
}

impl DiscordNotifier {
    pub fn new(webhook_url: String, discord_id: Option<u64>) -> Self {
        Self {
            client: Client::new(),
            webhook_url,
            discord_id,
        }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(&self, text: &str) -> Result<(), Error> {
        // If discord_id is None, we don't want to mention anyone
        let tag = self
            .discord_id
            .map_or(String::new(), |id| format!("<@{id}> "));

        let payload = DiscordMessage {
            content: format!("{tag}{text}"),
        };

        self.client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| Error::Transport(e.to_string()))?;

        Ok(())
    }
}
