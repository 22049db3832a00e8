//! Session identity.
//!
//! DESIGN
//! ======
//! A `ClientId` is a random token generated locally, never persisted, and
//! never reused after a reconnect. Identity is not a trust boundary, so the
//! token only needs to be collision-resistant across a few dozen peers.
//!
//! When the transport reconnects the session rotates to a fresh id. Retired
//! ids stay in the self-filter so echoes of the old id that are still in
//! flight are never mistaken for a remote participant.

use std::collections::VecDeque;
use std::fmt::{self, Write};

use rand::Rng;
use serde::{Deserialize, Serialize};

const CLIENT_ID_PREFIX: &str = "client-";
const CLIENT_ID_BYTES: usize = 8;

/// Retired ids remembered for self-echo suppression.
const MAX_RETIRED_IDS: usize = 8;

// =============================================================================
// CLIENT ID
// =============================================================================

/// Opaque per-session participant identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    /// Generate a fresh random id, e.g. `client-3f9a01c27be4d810`.
    #[must_use]
    pub fn generate() -> Self {
        let bytes: [u8; CLIENT_ID_BYTES] = rand::rng().random();
        Self(format!("{CLIENT_ID_PREFIX}{}", bytes_to_hex(&bytes)))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ClientId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ClientId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

// =============================================================================
// IDENTITY
// =============================================================================

/// The local participant's current id plus the ids it has retired.
#[derive(Debug, Clone)]
pub struct Identity {
    current: ClientId,
    retired: VecDeque<ClientId>,
}

impl Identity {
    #[must_use]
    pub fn new() -> Self {
        Self::with_id(ClientId::generate())
    }

    #[must_use]
    pub fn with_id(id: ClientId) -> Self {
        Self { current: id, retired: VecDeque::new() }
    }

    #[must_use]
    pub fn current(&self) -> &ClientId {
        &self.current
    }

    /// True for the current id and for any recently retired one.
    #[must_use]
    pub fn is_self(&self, id: &ClientId) -> bool {
        self.current == *id || self.retired.contains(id)
    }

    /// Retire the current id and switch to a freshly generated one.
    pub fn rotate(&mut self) -> &ClientId {
        let previous = std::mem::replace(&mut self.current, ClientId::generate());
        self.retired.push_back(previous);
        while self.retired.len() > MAX_RETIRED_IDS {
            self.retired.pop_front();
        }
        &self.current
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "identity_test.rs"]
mod tests;
