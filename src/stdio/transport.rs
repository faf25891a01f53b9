//! Connection lifecycle over a duplex byte stream
//!
//! The transport owns the stream. It moves through
//! `Starting -> Connected -> Closing -> Terminated` exactly once and reports why
//! it stopped so the binary can choose an exit status.

use std::future::Future;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::{errors::TransportError, stdio::handlers::handle_line, AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Starting,
    Connected,
    Closing,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// The peer closed its end of the stream.
    PeerClosed,
    /// The shutdown signal fired.
    Interrupted,
}

#[derive(Debug)]
pub struct Lifecycle {
    state: LifecycleState,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Starting,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Advances to the next state. Transitions only ever move forward.
    fn advance(&mut self, next: LifecycleState) {
        debug_assert!(
            matches!(
                (self.state, next),
                (LifecycleState::Starting, LifecycleState::Connected)
                    | (LifecycleState::Connected, LifecycleState::Closing)
                    | (LifecycleState::Closing, LifecycleState::Terminated)
            ),
            "invalid lifecycle transition {:?} -> {:?}",
            self.state,
            next
        );
        debug!(from = ?self.state, to = ?next, "transport state changed");
        self.state = next;
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

pub struct StdioTransport<R, W> {
    reader: R,
    writer: W,
    lifecycle: Lifecycle,
}

impl<R, W> StdioTransport<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            lifecycle: Lifecycle::new(),
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// Serves requests until the peer disconnects or `shutdown` resolves.
    ///
    /// A request that has started is always answered before shutdown is observed.
    pub async fn serve<S>(
        &mut self,
        state: &AppState,
        shutdown: S,
    ) -> Result<ShutdownReason, TransportError>
    where
        S: Future<Output = ()>,
    {
        self.lifecycle.advance(LifecycleState::Connected);
        info!(
            name = env!("CARGO_PKG_NAME"),
            version = env!("CARGO_PKG_VERSION"),
            "server running on stdio"
        );

        let outcome = self.pump(state, shutdown).await;

        self.lifecycle.advance(LifecycleState::Closing);
        if let Err(err) = self.writer.flush().await {
            warn!(error = %err, "failed to flush output while closing");
        }
        self.lifecycle.advance(LifecycleState::Terminated);

        match &outcome {
            Ok(reason) => info!(reason = ?reason, "server stopped"),
            Err(err) => warn!(error = %err, "server stopped on transport failure"),
        }
        outcome
    }

    async fn pump<S>(
        &mut self,
        state: &AppState,
        shutdown: S,
    ) -> Result<ShutdownReason, TransportError>
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut buffer = Vec::new();

        loop {
            buffer.clear();
            let read = tokio::select! {
                _ = &mut shutdown => return Ok(ShutdownReason::Interrupted),
                read = self.reader.read_until(b'\n', &mut buffer) => read?,
            };

            if read == 0 {
                return Ok(ShutdownReason::PeerClosed);
            }

            // Invalid UTF-8 is replaced so the line fails as a parse error instead of the stream.
            let line = String::from_utf8_lossy(&buffer);
            let message = line.trim();
            if message.is_empty() {
                continue;
            }

            if let Some(response) = handle_line(state, message).await {
                self.write_message(&response).await?;
            }
        }
    }

    async fn write_message(&mut self, message: &serde_json::Value) -> Result<(), TransportError> {
        let mut encoded = serde_json::to_vec(message)?;
        encoded.push(b'\n');
        self.writer.write_all(&encoded).await?;
        self.writer.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Lifecycle, LifecycleState};

    #[test]
    fn lifecycle_starts_in_starting_state() {
        assert_eq!(Lifecycle::new().state(), LifecycleState::Starting);
    }

    #[test]
    fn lifecycle_walks_forward_to_terminated() {
        let mut lifecycle = Lifecycle::default();
        lifecycle.advance(LifecycleState::Connected);
        lifecycle.advance(LifecycleState::Closing);
        lifecycle.advance(LifecycleState::Terminated);
        assert_eq!(lifecycle.state(), LifecycleState::Terminated);
    }
}
