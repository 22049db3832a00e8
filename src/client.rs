//! Headless client — connects to a relay and drives one [`Session`].
//!
//! ARCHITECTURE
//! ============
//! Three producer tasks feed one bounded command queue:
//!
//! ```text
//! stdin lines ──parse_line──┐
//! relay socket ─────────────┼──► mpsc<Command> ──► Session::handle (single consumer)
//! sweep interval ───────────┘
//! ```
//!
//! The consumer loop is the only place that touches presence state. Outbound
//! payloads go the other way through a per-connection queue owned by
//! [`WsTransport`]; dropping the transport ends that connection's writer.
//!
//! RECONNECT
//! =========
//! On disconnect the connection task reports a status, waits, and retries
//! with exponential backoff (1s doubling to 10s). A successful connection
//! resets the backoff.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::identity::Identity;
use crate::input::{LocalInput, parse_line};
use crate::prefs::{Prefs, PrefsError};
use crate::presence::TracingPresenter;
use crate::session::{Command, Flow, Session, Transport};

const COMMAND_QUEUE: usize = 256;
const OUTBOUND_QUEUE: usize = 256;
const INITIAL_BACKOFF_MS: u64 = 1000;
const MAX_BACKOFF_MS: u64 = 10_000;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Prefs(#[from] PrefsError),
    #[error("websocket connect failed: {0}")]
    WsConnect(Box<tokio_tungstenite::tungstenite::Error>),
}

// =============================================================================
// ENTRY POINT
// =============================================================================

/// Run the client until the user quits or opts out.
///
/// # Errors
///
/// Returns [`ClientError::Prefs`] if the preference file cannot be read or,
/// after an opt-out, written. Connection failures are retried, not returned.
pub async fn run(config: ClientConfig) -> Result<(), ClientError> {
    let prefs = Prefs::load(&config.prefs_file)?;
    if prefs.no_interaction {
        info!(path = %config.prefs_file.display(), "client: Interactivity disabled");
        return Ok(());
    }

    let (tx, mut rx) = mpsc::channel::<Command>(COMMAND_QUEUE);
    let stdin = spawn_stdin_reader(tx.clone());
    let connection = spawn_connection(config.url.clone(), tx.clone());
    let mut sweep = SweepTimer::start(config.presence.sweep_period, tx);

    let presenter = TracingPresenter::new(config.viewport, config.palette);
    let mut session = Session::new(Identity::new(), presenter, config.viewport, &config.presence);
    info!(id = %session.registry().identity().current(), url = %config.url, "client: starting");

    let mut flow = Flow::Continue;
    while let Some(command) = rx.recv().await {
        flow = session.handle(command);
        if flow != Flow::Continue {
            break;
        }
    }

    sweep.cancel();
    connection.abort();
    stdin.abort();
    if flow == Flow::Continue {
        session.teardown();
    }

    if flow == Flow::OptOut {
        Prefs { no_interaction: true }.save(&config.prefs_file)?;
        info!(path = %config.prefs_file.display(), "client: interactivity disabled for future sessions");
    }

    let stats = session.stats();
    info!(messages = stats.messages, latency_ms = ?stats.last_latency_ms, "client: stopped");
    Ok(())
}

// =============================================================================
// TRANSPORT
// =============================================================================

/// Outbound side of one relay connection.
pub struct WsTransport {
    tx: mpsc::Sender<String>,
}

impl WsTransport {
    #[must_use]
    pub fn new(tx: mpsc::Sender<String>) -> Self {
        Self { tx }
    }
}

impl Transport for WsTransport {
    fn is_ready(&self) -> bool {
        !self.tx.is_closed()
    }

    fn send(&mut self, payload: String) {
        match self.tx.try_send(payload) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("client: outbound queue full; dropping event");
            }
            Err(TrySendError::Closed(_)) => {
                debug!("client: outbound queue closed; dropping event");
            }
        }
    }
}

// =============================================================================
// CONNECTION
// =============================================================================

/// Spawn the connect/reconnect loop. It runs until the command queue closes.
pub fn spawn_connection(url: String, commands: mpsc::Sender<Command>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            match connect_and_run(&url, &commands).await {
                Ok(()) => {
                    info!("client: relay connection closed");
                    backoff_ms = INITIAL_BACKOFF_MS;
                }
                Err(e) => warn!(error = %e, "client: relay connection failed"),
            }

            let status = format!("Disconnected, retrying in {}s", backoff_ms / 1000);
            if commands.send(Command::Disconnected(status)).await.is_err() {
                return;
            }

            tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            backoff_ms = (backoff_ms * 2).min(MAX_BACKOFF_MS);
        }
    })
}

/// Connect once and pump frames until either direction ends.
async fn connect_and_run(url: &str, commands: &mpsc::Sender<Command>) -> Result<(), ClientError> {
    let (stream, _) = connect_async(url)
        .await
        .map_err(|e| ClientError::WsConnect(Box::new(e)))?;
    let (mut ws_write, mut ws_read) = stream.split();

    let (out_tx, mut out_rx) = mpsc::channel::<String>(OUTBOUND_QUEUE);
    if commands
        .send(Command::Connected(Box::new(WsTransport::new(out_tx))))
        .await
        .is_err()
    {
        return Ok(());
    }
    info!(url, "client: connected");

    let send_task = async {
        while let Some(payload) = out_rx.recv().await {
            if ws_write.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
        let _ = ws_write.close().await;
    };

    let recv_task = async {
        while let Some(msg) = ws_read.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    if commands.send(Command::Inbound(text.as_str().to_owned())).await.is_err() {
                        break;
                    }
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "client: ws recv error");
                    break;
                }
            }
        }
    };

    tokio::select! {
        () = send_task => {}
        () = recv_task => {}
    }
    Ok(())
}

// =============================================================================
// LOCAL INPUT
// =============================================================================

/// Read local input lines from stdin. End of input quits the session.
pub fn spawn_stdin_reader(commands: mpsc::Sender<Command>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let input = match lines.next_line().await {
                Ok(Some(line)) => match parse_line(&line) {
                    Ok(Some(input)) => input,
                    Ok(None) => continue,
                    Err(e) => {
                        warn!(error = %e, "client: ignoring input line");
                        continue;
                    }
                },
                Ok(None) => LocalInput::Quit,
                Err(e) => {
                    warn!(error = %e, "client: stdin read failed");
                    LocalInput::Quit
                }
            };

            let done = input == LocalInput::Quit;
            if commands.send(Command::Local(input)).await.is_err() || done {
                return;
            }
        }
    })
}

// =============================================================================
// SWEEP TIMER
// =============================================================================

/// Periodic `Tick` producer. Cancelled explicitly or on drop.
pub struct SweepTimer {
    handle: Option<JoinHandle<()>>,
}

impl SweepTimer {
    /// Start ticking every `period`. The first tick fires one period from now.
    #[must_use]
    pub fn start(period: Duration, commands: mpsc::Sender<Command>) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if commands.send(Command::Tick).await.is_err() {
                    return;
                }
            }
        });
        Self { handle: Some(handle) }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for SweepTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
