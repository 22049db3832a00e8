//! Session — the single writer for all presence state.
//!
//! DESIGN
//! ======
//! Inbound frames, local input, sweep ticks, and transport lifecycle changes
//! all arrive as [`Command`]s on one queue. `Session::handle_at` applies them
//! one at a time, so the registry and local state never see concurrent
//! mutation and nothing here needs a lock.
//!
//! Local pointer input takes two paths at once: it is encoded and sent
//! outbound, and it is drawn locally as a trail segment (self path). Remote
//! events come back through `Inbound` and go to the registry.
//!
//! ERROR HANDLING
//! ==============
//! Nothing here is fatal. A missing/unready transport drops the outbound
//! event, a malformed payload drops that one message, and a departure for an
//! unknown peer is a no-op. Each is logged with its error code.

use std::num::NonZeroU32;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::{ConfigError, PresenceConfig, checked_viewport};
use crate::error::{ErrorCode, PresenceError};
use crate::identity::Identity;
use crate::input::LocalInput;
use crate::presence::{Presenter, PresenceRegistry};
use crate::protocol::{self, CursorEvent, EventKind, Inbound, Millis, Position};
use crate::trail::{Segment, Viewport};

// =============================================================================
// TRANSPORT
// =============================================================================

/// Outbound half of the connection, as seen by the session.
pub trait Transport {
    /// Readiness predicate checked before every send.
    fn is_ready(&self) -> bool;

    /// Fire-and-forget. A full buffer may silently drop the payload.
    fn send(&mut self, payload: String);

    fn close(&mut self) {}
}

// =============================================================================
// COMMANDS
// =============================================================================

/// One unit of work for the session.
pub enum Command {
    /// Raw text frame from the relay.
    Inbound(String),
    Local(LocalInput),
    /// Periodic sweep timer fired.
    Tick,
    Connected(Box<dyn Transport + Send>),
    /// The transport went away; the string is the user-facing status.
    Disconnected(String),
}

/// What the driver should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Explicit teardown: stop the sweep and close the connection.
    Teardown,
    /// Teardown and persist the "no interaction" preference.
    OptOut,
}

// =============================================================================
// STATE
// =============================================================================

/// Local pointer state. Only reflected into outgoing events, never sent as is.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocalState {
    pub previous_position: Option<Position>,
    pub pressed: bool,
    /// Local move events captured so far, sent or not.
    pub moves: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiveStats {
    /// Every inbound frame, including self-echoes and undecodable ones.
    pub messages: u64,
    /// `now - t` of the latest frame carrying a timestamp.
    pub last_latency_ms: Option<Millis>,
}

pub struct Session<P: Presenter> {
    registry: PresenceRegistry<P>,
    local: LocalState,
    viewport: Viewport,
    emit_stride: NonZeroU32,
    transport: Option<Box<dyn Transport + Send>>,
    stats: ReceiveStats,
    connections: u32,
}

impl<P: Presenter> Session<P> {
    #[must_use]
    pub fn new(identity: Identity, presenter: P, viewport: Viewport, config: &PresenceConfig) -> Self {
        Self {
            registry: PresenceRegistry::new(identity, presenter, config.liveness_timeout),
            local: LocalState::default(),
            viewport,
            emit_stride: config.emit_stride,
            transport: None,
            stats: ReceiveStats::default(),
            connections: 0,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &PresenceRegistry<P> {
        &self.registry
    }

    #[must_use]
    pub fn local(&self) -> &LocalState {
        &self.local
    }

    #[must_use]
    pub fn stats(&self) -> ReceiveStats {
        self.stats
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.transport.as_ref().is_some_and(|t| t.is_ready())
    }

    /// Apply one command now.
    pub fn handle(&mut self, command: Command) -> Flow {
        self.handle_at(command, Instant::now(), protocol::now_ms())
    }

    /// Apply one command at an explicit monotonic instant and wall-clock time.
    pub fn handle_at(&mut self, command: Command, now: Instant, now_ms: Millis) -> Flow {
        match command {
            Command::Inbound(text) => {
                if let Err(e) = self.receive_at(&text, now, now_ms) {
                    debug!(code = e.error_code(), error = %e, "session: inbound dropped");
                }
                Flow::Continue
            }
            Command::Local(input) => self.local_input(input, now_ms),
            Command::Tick => {
                self.registry.sweep_at(now);
                Flow::Continue
            }
            Command::Connected(transport) => {
                self.connected(transport);
                Flow::Continue
            }
            Command::Disconnected(status) => {
                self.transport = None;
                self.registry.presenter_mut().on_status(&status);
                Flow::Continue
            }
        }
    }

    // -------------------------------------------------------------------------
    // INBOUND
    // -------------------------------------------------------------------------

    /// Decode one inbound frame and apply it to the registry.
    ///
    /// # Errors
    ///
    /// [`PresenceError::Decode`] for malformed payloads and
    /// [`PresenceError::UnknownPeer`] for a departure of an untracked peer.
    /// Registry state is unchanged in both cases.
    pub fn receive_at(&mut self, text: &str, now: Instant, now_ms: Millis) -> Result<(), PresenceError> {
        self.stats.messages += 1;

        match protocol::decode(text)? {
            Inbound::Cursor(event) => {
                if let Some(sent_at) = event.timestamp {
                    // `t` is peer-controlled and may be arbitrarily far off.
                    self.stats.last_latency_ms = Some(now_ms.saturating_sub(sent_at));
                }
                self.registry.ingest_at(&event, now);
                Ok(())
            }
            Inbound::Part(id) => {
                if self.registry.identity().is_self(&id) {
                    return Ok(());
                }
                self.registry.forget(&id)
            }
        }
    }

    // -------------------------------------------------------------------------
    // LOCAL INPUT
    // -------------------------------------------------------------------------

    fn local_input(&mut self, input: LocalInput, now_ms: Millis) -> Flow {
        match input {
            LocalInput::Pointer { kind, x, y } => {
                if let Err(e) = self.capture(kind, x, y, now_ms) {
                    debug!(code = e.error_code(), "session: outbound dropped");
                }
                Flow::Continue
            }
            LocalInput::Resize { width, height } => {
                if let Err(e) = self.resize(width, height) {
                    warn!(error = %e, "session: ignoring resize");
                }
                Flow::Continue
            }
            LocalInput::OptOut => {
                self.teardown();
                Flow::OptOut
            }
            LocalInput::Quit => {
                self.teardown();
                Flow::Teardown
            }
        }
    }

    /// Capture a local pointer action in device pixels.
    ///
    /// Moves draw the local trail segment whether or not they are sent; only
    /// every `emit_stride`-th move goes out. Down and Up are always sent.
    ///
    /// # Errors
    ///
    /// Returns [`PresenceError::TransportUnavailable`] when the event should
    /// have been sent but the transport is missing or not ready.
    pub fn capture(&mut self, kind: EventKind, px: f64, py: f64, now_ms: Millis) -> Result<(), PresenceError> {
        let position = Position::from_device(px, py, self.viewport.width, self.viewport.height);
        self.local.pressed = kind.pressed_after(self.local.pressed);

        let should_send = if kind == EventKind::Move {
            self.local.moves += 1;
            let segment = Segment::between(self.local.previous_position, position, self.local.pressed);
            self.registry.presenter_mut().on_draw_segment(segment);
            self.local.previous_position = Some(position);
            self.local.moves % u64::from(self.emit_stride.get()) == 0
        } else {
            true
        };

        if !should_send {
            return Ok(());
        }

        let event = CursorEvent::new(self.registry.identity().current().clone(), kind, position, self.local.pressed)
            .with_timestamp(now_ms);
        self.emit(&event)
    }

    /// Send one event if the transport is ready.
    ///
    /// # Errors
    ///
    /// Returns [`PresenceError::TransportUnavailable`] otherwise.
    pub fn emit(&mut self, event: &CursorEvent) -> Result<(), PresenceError> {
        match self.transport.as_mut() {
            Some(transport) if transport.is_ready() => {
                transport.send(protocol::encode(event));
                Ok(())
            }
            _ => Err(PresenceError::TransportUnavailable),
        }
    }

    /// Change the capture viewport. Later captures normalize against it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidViewport`] unless both extents are finite
    /// and positive; the previous viewport stays in effect.
    pub fn resize(&mut self, width: f64, height: f64) -> Result<(), ConfigError> {
        let viewport = checked_viewport(width, height)?;
        self.viewport = viewport;
        self.registry.presenter_mut().on_viewport_changed(viewport);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // LIFECYCLE
    // -------------------------------------------------------------------------

    fn connected(&mut self, transport: Box<dyn Transport + Send>) {
        if self.connections > 0 {
            let id = self.registry.identity_mut().rotate();
            info!(%id, "session: rotated client id after reconnect");
        }
        self.connections += 1;
        self.transport = Some(transport);
        info!(id = %self.registry.identity().current(), "session: connected");
    }

    /// Close the transport and drop every remote avatar.
    pub fn teardown(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close();
        }
        let removed = self.registry.clear();
        self.local = LocalState::default();
        info!(removed, "session: torn down");
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
