//! IRC adapter - Plain TCP connection to a chat server

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::application::errors::BotError;
use crate::domain::traits::ChatConnection;

/// Outbound line for a channel message
pub fn privmsg_line(channel: &str, text: &str) -> String {
    format!("PRIVMSG #{} :{}", channel, text)
}

/// Outbound keep-alive answer
pub fn pong_line(token: &str) -> String {
    format!("PONG {}", token)
}

/// Login sequence: password, nick, user, then join
pub fn login_lines(password: Option<&str>, nick: &str, channel: &str) -> Vec<String> {
    let mut lines = Vec::with_capacity(4);
    if let Some(password) = password {
        lines.push(format!("PASS {}", password));
    }
    lines.push(format!("NICK {}", nick));
    lines.push(format!("USER {0} {0} {0} :{0}", nick));
    lines.push(format!("JOIN #{}", channel));
    lines
}

/// IRC connection joined to a single channel
pub struct IrcConnection {
    stream: Option<TcpStream>,
    channel: String,
}

impl IrcConnection {
    pub async fn connect(host: &str, port: u16, channel: impl Into<String>) -> Result<Self, BotError> {
        let stream = TcpStream::connect((host, port))
            .await
            .map_err(|e| BotError::Network(format!("Failed to connect to {}:{}: {}", host, port, e)))?;

        tracing::info!("Connected to {}:{}", host, port);

        Ok(Self {
            stream: Some(stream),
            channel: channel.into(),
        })
    }

    /// Authenticate and join the channel
    pub async fn login(&mut self, password: Option<&str>, nick: &str) -> Result<(), BotError> {
        let channel = self.channel.clone();
        for line in login_lines(password, nick, &channel) {
            self.send_line(&line).await?;
        }
        tracing::info!("Joined #{} as {}", channel, nick);
        Ok(())
    }

    async fn send_line(&mut self, line: &str) -> Result<(), BotError> {
        let stream = self.stream
            .as_mut()
            .ok_or_else(|| BotError::Connection("connection already closed".to_string()))?;

        stream
            .write_all(format!("{}\r\n", line).as_bytes())
            .await
            .map_err(|e| BotError::Network(e.to_string()))
    }
}

#[async_trait]
impl ChatConnection for IrcConnection {
    async fn recv(&mut self, buf: &mut [u8]) -> Result<usize, BotError> {
        let stream = self.stream
            .as_mut()
            .ok_or_else(|| BotError::Connection("connection already closed".to_string()))?;

        stream.read(buf).await.map_err(|e| BotError::Network(e.to_string()))
    }

    async fn pong(&mut self, token: &str) -> Result<(), BotError> {
        self.send_line(&pong_line(token)).await
    }

    async fn privmsg(&mut self, text: &str) -> Result<(), BotError> {
        let line = privmsg_line(&self.channel, text);
        self.send_line(&line).await
    }

    async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                tracing::debug!("Error while closing connection: {}", e);
            }
        }
    }
}
