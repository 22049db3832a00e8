//! Presence tracking for remote participants.
//!
//! ARCHITECTURE
//! ============
//! `registry` is the state machine: it ingests decoded events, tracks
//! liveness, and decides what to draw and who to evict. `presenter` is the
//! capability the registry reports to; it owns nothing but pixels and logs.

pub mod presenter;
pub mod registry;

pub use presenter::{Avatar, AvatarState, Presenter, TracingPresenter, people_label};
pub use registry::{DEFAULT_LIVENESS_TIMEOUT, Ingested, PeerStatus, PresenceRegistry, RegistryEntry};
