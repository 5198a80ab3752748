use std::future::Future;
use std::time::Instant;

use crate::application::errors::BotError;
use crate::application::messaging::{Dispatcher, LineFramer, Outbound};
use crate::domain::traits::ChatConnection;

/// Bytes requested per read
const READ_CHUNK: usize = 4096;

/// Service driving the ingestion loop over one connection
pub struct ChatService<C: ChatConnection> {
    connection: C,
    framer: LineFramer,
    dispatcher: Dispatcher,
}

impl<C: ChatConnection> ChatService<C> {
    pub fn new(connection: C, dispatcher: Dispatcher) -> Self {
        Self {
            connection,
            framer: LineFramer::new(),
            dispatcher,
        }
    }

    #[cfg(test)]
    pub fn into_parts(self) -> (C, Dispatcher) {
        (self.connection, self.dispatcher)
    }

    /// Read, frame and dispatch until the link drops or `shutdown` resolves.
    ///
    /// The roster is fetched before the first read. The connection is closed
    /// exactly once on every exit path. Returns `Ok` only for a requested
    /// shutdown.
    pub async fn run<F>(&mut self, shutdown: F) -> Result<(), BotError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut buf = vec![0u8; READ_CHUNK];

        self.dispatcher.refresh_roster(Instant::now()).await;

        let result = 'ingest: loop {
            let read = tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested");
                    break 'ingest Ok(());
                }
                read = self.connection.recv(&mut buf) => read,
            };

            let n = match read {
                Ok(0) => break Err(BotError::Connection("peer closed the connection".to_string())),
                Ok(n) => n,
                Err(e) => break Err(e),
            };

            for line in self.framer.push(&buf[..n]) {
                if let Err(e) = self.process_line(&line).await {
                    break 'ingest Err(e);
                }
            }
        };

        self.connection.close().await;
        tracing::info!("Disconnected");
        result
    }

    async fn process_line(&mut self, line: &str) -> Result<(), BotError> {
        let now = Instant::now();
        let kind = self.dispatcher.handle_line(line, now);
        self.flush().await?;

        if kind.ticks() {
            self.dispatcher.tick(now).await;
            self.flush().await?;
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), BotError> {
        for outbound in self.dispatcher.drain_outbound() {
            match outbound {
                Outbound::Pong(token) => self.connection.pong(&token).await?,
                Outbound::Chat(text) => self.connection.privmsg(&text).await?,
            }
        }
        Ok(())
    }
}
