use async_trait::async_trait;
use crate::application::errors::BotError;

/// ChatConnection trait - abstraction over the line-oriented chat transport
#[async_trait]
pub trait ChatConnection: Send {
    /// Read the next chunk of raw bytes; `Ok(0)` means the peer closed the link
    async fn recv(&mut self, buf: &mut [u8]) -> Result<usize, BotError>;

    /// Answer a keep-alive request, echoing its argument
    async fn pong(&mut self, token: &str) -> Result<(), BotError>;

    /// Send a message to the joined channel
    async fn privmsg(&mut self, text: &str) -> Result<(), BotError>;

    /// Close the connection
    async fn close(&mut self);
}
