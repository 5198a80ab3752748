use async_trait::async_trait;
use crate::application::errors::BotError;
use crate::domain::entities::Roster;

/// RosterSource trait - fetches the channel's current participants and roles
#[async_trait]
pub trait RosterSource: Send + Sync {
    async fn fetch(&self) -> Result<Roster, BotError>;
}
