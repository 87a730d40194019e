//! Push connection state machine.
//!
//! Runs the read loop for a single WebSocket connection, handing text
//! frames to the [`AwardFeed`] in arrival order and publishing phase
//! transitions on a watch channel.

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use super::{AwardFeed, ConnectionPhase};
use crate::error::FeedError;

/// Handle to one open (or opening) push connection.
///
/// Dropping the handle shuts the connection down, so the socket is
/// released on every exit path of the owning scope. [`FeedConnection::close`]
/// does the same and additionally waits for the close handshake.
#[derive(Debug)]
pub struct FeedConnection {
    endpoint: String,
    phase: watch::Receiver<ConnectionPhase>,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl FeedConnection {
    /// Address this connection was opened against.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> ConnectionPhase {
        *self.phase.borrow()
    }

    /// Receiver observing phase transitions.
    #[must_use]
    pub fn watch_phase(&self) -> watch::Receiver<ConnectionPhase> {
        self.phase.clone()
    }

    /// Closes the connection and waits for its task to finish.
    pub async fn close(self) {
        let Self {
            endpoint,
            shutdown,
            task,
            ..
        } = self;
        let _ = shutdown.send(());
        if let Err(err) = task.await {
            tracing::warn!(%endpoint, error = %err, "feed connection task failed");
        }
    }
}

/// Spawns the connection task and returns its handle.
pub(crate) fn spawn_connection(endpoint: String, feed: AwardFeed) -> FeedConnection {
    let (phase_tx, phase_rx) = watch::channel(ConnectionPhase::Connecting);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let task = tokio::spawn(run_connection(
        endpoint.clone(),
        feed,
        phase_tx,
        shutdown_rx,
    ));
    FeedConnection {
        endpoint,
        phase: phase_rx,
        shutdown: shutdown_tx,
        task,
    }
}

/// Connects, then reads frames until either side closes.
///
/// The shutdown receiver resolves both on an explicit close and when the
/// handle is dropped.
async fn run_connection(
    endpoint: String,
    feed: AwardFeed,
    phase: watch::Sender<ConnectionPhase>,
    mut shutdown: oneshot::Receiver<()>,
) {
    tracing::info!(%endpoint, phase = %ConnectionPhase::Connecting, "feed connecting");

    let stream = tokio::select! {
        _ = &mut shutdown => {
            set_phase(&phase, &endpoint, ConnectionPhase::Closed);
            return;
        }
        result = connect_async(endpoint.as_str()) => match result {
            Ok((stream, _response)) => stream,
            Err(err) => {
                let err = FeedError::from(err);
                tracing::warn!(%endpoint, error = %err, "feed connection failed");
                set_phase(&phase, &endpoint, ConnectionPhase::Closed);
                return;
            }
        },
    };

    set_phase(&phase, &endpoint, ConnectionPhase::Open);
    let (mut ws_tx, mut ws_rx) = stream.split();

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                if let Err(err) = ws_tx.send(Message::Close(None)).await {
                    tracing::debug!(%endpoint, error = %err, "close frame not sent");
                }
                break;
            }
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        feed.on_message(text.as_str()).await;
                    }
                    Some(Ok(Message::Binary(bytes))) => {
                        feed.discard(&FeedError::NonText(bytes.len()));
                    }
                    Some(Ok(Message::Close(frame))) => {
                        tracing::debug!(%endpoint, ?frame, "feed closed by server");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        let err = FeedError::from(err);
                        tracing::warn!(%endpoint, error = %err, "feed receive failed");
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    set_phase(&phase, &endpoint, ConnectionPhase::Closed);
}

fn set_phase(phase: &watch::Sender<ConnectionPhase>, endpoint: &str, next: ConnectionPhase) {
    phase.send_replace(next);
    tracing::info!(%endpoint, phase = %next, "feed phase changed");
}
