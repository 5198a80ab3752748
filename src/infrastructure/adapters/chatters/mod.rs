//! Chatters adapter - Channel roster over HTTP

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::application::errors::BotError;
use crate::domain::entities::Roster;
use crate::domain::traits::RosterSource;

/// Chatters endpoint response
#[derive(Debug, Clone, Deserialize)]
pub struct ChattersResponse {
    #[serde(default)]
    pub chatter_count: u64,
    #[serde(default)]
    pub chatters: Chatters,
}

/// Only the moderator group grants privileges
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Chatters {
    #[serde(default)]
    pub moderators: Vec<String>,
}

impl From<ChattersResponse> for Roster {
    fn from(response: ChattersResponse) -> Self {
        Roster::new()
            .with_chatter_count(response.chatter_count)
            .with_moderators(&response.chatters.moderators)
            .fetched_now()
    }
}

/// Fetches the roster for one channel
pub struct ChattersSource {
    client: Client,
    url: String,
}

impl ChattersSource {
    pub fn new(url: impl Into<String>) -> Result<Self, BotError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| BotError::Network(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl RosterSource for ChattersSource {
    async fn fetch(&self) -> Result<Roster, BotError> {
        let response = self.client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BotError::Network(format!("chatters request failed: {}", response.status())));
        }

        let data: ChattersResponse = response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        Ok(data.into())
    }
}
