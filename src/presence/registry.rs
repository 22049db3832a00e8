//! Presence registry — who is on the canvas right now.
//!
//! DESIGN
//! ======
//! The registry exclusively owns one [`RegistryEntry`] per remote participant,
//! keyed by `ClientId`, together with that participant's avatar handle. Every
//! mutation goes through `&mut self`, so the single-threaded command loop is
//! the only writer and no locking is needed.
//!
//! Per-peer lifecycle:
//!
//! ```text
//! Unknown ──ingest──▶ Active ──(silent > timeout)──▶ Stale ──sweep──▶ Unknown
//!                       ▲  │
//!                       └──┘ ingest refreshes last_seen
//! ```
//!
//! A late event processed before the sweep refreshes `last_seen` and keeps
//! the peer alive for that cycle. Removal moves the handle back into the
//! presenter, so it is destroyed exactly once.
//!
//! Timestamps are explicit (`*_at` variants) so tests can drive the clock.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::error::PresenceError;
use crate::identity::{ClientId, Identity};
use crate::presence::presenter::{AvatarState, Presenter};
use crate::protocol::{CursorEvent, Position};
use crate::trail::Segment;

/// Default silence after which a peer is presumed gone.
pub const DEFAULT_LIVENESS_TIMEOUT: Duration = Duration::from_millis(5000);

// =============================================================================
// TYPES
// =============================================================================

/// Last-known state of one remote participant.
#[derive(Debug)]
pub struct RegistryEntry<H> {
    /// Absent until the first event has been applied.
    pub last_position: Option<Position>,
    pub pressed: bool,
    pub last_seen: Instant,
    pub avatar: AvatarState,
    pub handle: H,
}

impl<H> RegistryEntry<H> {
    fn new(handle: H, now: Instant) -> Self {
        Self { last_position: None, pressed: false, last_seen: now, avatar: AvatarState::default(), handle }
    }
}

/// Liveness view of a single id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerStatus {
    Unknown,
    Active,
    /// Timed out, waiting for the next sweep.
    Stale,
}

/// What `ingest` did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingested {
    /// Our own event echoed back; nothing changed.
    SelfEcho,
    /// First event from this peer; an entry was created.
    Joined,
    Updated,
}

// =============================================================================
// REGISTRY
// =============================================================================

pub struct PresenceRegistry<P: Presenter> {
    identity: Identity,
    entries: HashMap<ClientId, RegistryEntry<P::Handle>>,
    presenter: P,
    liveness_timeout: Duration,
}

impl<P: Presenter> PresenceRegistry<P> {
    #[must_use]
    pub fn new(identity: Identity, presenter: P, liveness_timeout: Duration) -> Self {
        Self { identity, entries: HashMap::new(), presenter, liveness_timeout }
    }

    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn identity_mut(&mut self) -> &mut Identity {
        &mut self.identity
    }

    #[must_use]
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    #[must_use]
    pub fn liveness_timeout(&self) -> Duration {
        self.liveness_timeout
    }

    /// Remote entries plus the local participant.
    #[must_use]
    pub fn participant_count(&self) -> usize {
        self.entries.len() + 1
    }

    #[must_use]
    pub fn peer(&self, id: &ClientId) -> Option<&RegistryEntry<P::Handle>> {
        self.entries.get(id)
    }

    pub fn peers(&self) -> impl Iterator<Item = (&ClientId, &RegistryEntry<P::Handle>)> {
        self.entries.iter()
    }

    #[must_use]
    pub fn status_at(&self, id: &ClientId, now: Instant) -> PeerStatus {
        match self.entries.get(id) {
            None => PeerStatus::Unknown,
            Some(entry) if self.is_expired(entry, now) => PeerStatus::Stale,
            Some(_) => PeerStatus::Active,
        }
    }

    // -------------------------------------------------------------------------
    // INGEST
    // -------------------------------------------------------------------------

    /// Apply one inbound event at the current instant.
    pub fn ingest(&mut self, event: &CursorEvent) -> Ingested {
        self.ingest_at(event, Instant::now())
    }

    /// Apply one inbound event observed at `now`.
    pub fn ingest_at(&mut self, event: &CursorEvent, now: Instant) -> Ingested {
        let id = &event.client_id;
        if self.identity.is_self(id) {
            return Ingested::SelfEcho;
        }

        let joined = !self.entries.contains_key(id);
        let count_after_join = self.entries.len() + 2;
        let presenter = &mut self.presenter;
        let entry = self
            .entries
            .entry(id.clone())
            .or_insert_with(|| RegistryEntry::new(presenter.on_peer_first_seen(id), now));

        if joined {
            info!(%id, count = count_after_join, "presence: peer active");
            presenter.on_participant_count_changed(count_after_join);
        }

        entry.pressed = event.kind.pressed_after(event.pressed);
        entry.last_seen = entry.last_seen.max(now);

        presenter.on_draw_segment(Segment::between(entry.last_position, event.position, entry.pressed));
        entry.avatar.apply(event.kind);
        presenter.on_peer_updated(&mut entry.handle, event.position, entry.avatar);
        entry.last_position = Some(event.position);

        if joined { Ingested::Joined } else { Ingested::Updated }
    }

    // -------------------------------------------------------------------------
    // EVICTION
    // -------------------------------------------------------------------------

    /// Evict every peer silent for longer than the liveness timeout.
    pub fn sweep(&mut self) -> usize {
        self.sweep_at(Instant::now())
    }

    /// Evict relative to `now`. Returns how many peers were removed.
    pub fn sweep_at(&mut self, now: Instant) -> usize {
        let stale: Vec<ClientId> = self
            .entries
            .iter()
            .filter(|(_, entry)| self.is_expired(entry, now))
            .map(|(id, _)| id.clone())
            .collect();

        for id in &stale {
            if let Some(entry) = self.entries.remove(id) {
                info!(%id, "presence: peer evicted");
                self.presenter.on_peer_removed(id, entry.handle);
            }
        }

        if !stale.is_empty() {
            self.publish_count();
        }
        stale.len()
    }

    /// Remove one peer immediately, e.g. on a relay departure notice.
    ///
    /// # Errors
    ///
    /// Returns [`PresenceError::UnknownPeer`] if the id is not tracked
    /// (already evicted, or never seen). Callers treat that as a no-op.
    pub fn forget(&mut self, id: &ClientId) -> Result<(), PresenceError> {
        let Some(entry) = self.entries.remove(id) else {
            return Err(PresenceError::UnknownPeer(id.clone()));
        };
        info!(%id, "presence: peer departed");
        self.presenter.on_peer_removed(id, entry.handle);
        self.publish_count();
        Ok(())
    }

    /// Remove every peer. Used on teardown.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        for (id, entry) in self.entries.drain() {
            self.presenter.on_peer_removed(&id, entry.handle);
        }
        if removed > 0 {
            debug!(removed, "presence: registry cleared");
            self.publish_count();
        }
        removed
    }

    fn is_expired(&self, entry: &RegistryEntry<P::Handle>, now: Instant) -> bool {
        now.saturating_duration_since(entry.last_seen) > self.liveness_timeout
    }

    fn publish_count(&mut self) {
        let count = self.participant_count();
        self.presenter.on_participant_count_changed(count);
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use crate::protocol::EventKind;
    use crate::trail::Viewport;

    /// One observed presenter callback.
    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Count(usize),
        FirstSeen(ClientId),
        Updated(ClientId, Position, AvatarState),
        Removed(ClientId),
        Draw(Segment),
        Viewport(Viewport),
        Status(String),
    }

    /// Presenter that records every callback in order.
    #[derive(Debug, Default)]
    pub struct RecordingPresenter {
        pub calls: Vec<Call>,
    }

    impl RecordingPresenter {
        #[must_use]
        pub fn draws(&self) -> Vec<Segment> {
            self.calls
                .iter()
                .filter_map(|c| if let Call::Draw(s) = c { Some(*s) } else { None })
                .collect()
        }

        #[must_use]
        pub fn counts(&self) -> Vec<usize> {
            self.calls
                .iter()
                .filter_map(|c| if let Call::Count(n) = c { Some(*n) } else { None })
                .collect()
        }

        #[must_use]
        pub fn removals(&self, id: &ClientId) -> usize {
            self.calls
                .iter()
                .filter(|c| matches!(c, Call::Removed(r) if r == id))
                .count()
        }
    }

    impl Presenter for RecordingPresenter {
        type Handle = ClientId;

        fn on_participant_count_changed(&mut self, count: usize) {
            self.calls.push(Call::Count(count));
        }

        fn on_peer_first_seen(&mut self, id: &ClientId) -> ClientId {
            self.calls.push(Call::FirstSeen(id.clone()));
            id.clone()
        }

        fn on_peer_updated(&mut self, handle: &mut ClientId, position: Position, state: AvatarState) {
            self.calls.push(Call::Updated(handle.clone(), position, state));
        }

        fn on_peer_removed(&mut self, id: &ClientId, handle: ClientId) {
            assert_eq!(*id, handle, "handle must belong to the removed peer");
            self.calls.push(Call::Removed(handle));
        }

        fn on_draw_segment(&mut self, segment: Segment) {
            self.calls.push(Call::Draw(segment));
        }

        fn on_viewport_changed(&mut self, viewport: Viewport) {
            self.calls.push(Call::Viewport(viewport));
        }

        fn on_status(&mut self, status: &str) {
            self.calls.push(Call::Status(status.to_owned()));
        }
    }

    pub const LOCAL_ID: &str = "client-local";

    #[must_use]
    pub fn registry() -> PresenceRegistry<RecordingPresenter> {
        PresenceRegistry::new(
            Identity::with_id(ClientId::from(LOCAL_ID)),
            RecordingPresenter::default(),
            DEFAULT_LIVENESS_TIMEOUT,
        )
    }

    #[must_use]
    pub fn event(id: &str, kind: EventKind, x: f64, y: f64, pressed: bool) -> CursorEvent {
        CursorEvent::new(ClientId::from(id), kind, Position::new(x, y), pressed)
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
