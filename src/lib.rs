//! Shared live cursor canvas.
//!
//! Every participant's pointer is broadcast as a small JSON event through a
//! relay. Each client tracks the other participants it hears from, draws
//! their trails, counts who is present, and evicts anyone who goes silent.
//! The binary runs either role: the relay, or a headless client that reads
//! local pointer input from stdin.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`identity`] | Client ids and the session identity (current + retired ids) |
//! | [`protocol`] | Cursor event types and the wire codec |
//! | [`error`] | Presence error taxonomy with grepable codes |
//! | [`trail`] | Pure trail stroke computation and the drawing surface |
//! | [`presence`] | Presence registry state machine and the presenter capability |
//! | [`session`] | Single-threaded command handling, local state, emission stride |
//! | [`input`] | Line protocol for local pointer input |
//! | [`prefs`] | Persisted "disable interactivity" flag |
//! | [`config`] | CLI flags and environment configuration |
//! | [`client`] | WebSocket client with reconnect backoff and the sweep timer |
//! | [`relay`] | Broadcast relay server |

pub mod client;
pub mod config;
pub mod error;
pub mod identity;
pub mod input;
pub mod prefs;
pub mod presence;
pub mod protocol;
pub mod relay;
pub mod session;
pub mod trail;
