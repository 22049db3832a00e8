//! Cursor event protocol — the wire unit shared by the relay and clients.
//!
//! ARCHITECTURE
//! ============
//! Every message on the shared canvas is one flat JSON object. Clients send
//! cursor events; the relay fans them out to every peer (sender included)
//! and, when a connection closes, sends a departure notice for it.
//!
//! ```text
//! { "x": 0.25, "y": 0.5, "cid": "client-…", "type": "mousemove", "md": false, "t": 1700000000000 }
//! { "type": "part", "cid": "client-…" }
//! ```
//!
//! DESIGN
//! ======
//! - Positions are normalized to `[0,1]×[0,1]` so every receiver can rescale
//!   to its own viewport.
//! - Decoding reads only the first JSON value of a payload, so trailing
//!   framing noise (`"{…}\nXYZ"`) decodes like the clean prefix.
//! - Unknown fields are ignored; `t` is optional.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;
use crate::identity::ClientId;

/// Milliseconds since the Unix epoch.
pub type Millis = i64;

/// Current wall-clock time as milliseconds since the Unix epoch.
#[must_use]
pub fn now_ms() -> Millis {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

// =============================================================================
// POSITION
// =============================================================================

/// Normalized pointer position, independent of viewport size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Normalize raw device coordinates against the viewport extents at the
    /// moment of capture. Coordinates outside the viewport are clamped to it.
    #[must_use]
    pub fn from_device(px: f64, py: f64, width: f64, height: f64) -> Self {
        Self { x: normalize(px, width), y: normalize(py, height) }
    }
}

fn normalize(value: f64, extent: f64) -> f64 {
    if extent <= 0.0 || !value.is_finite() {
        return 0.0;
    }
    (value / extent).clamp(0.0, 1.0)
}

fn check_unit(field: &'static str, value: f64) -> Result<f64, DecodeError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(DecodeError::OutOfRange { field, value })
    }
}

// =============================================================================
// EVENTS
// =============================================================================

/// What the pointer did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "mousemove")]
    Move,
    #[serde(rename = "mousedown")]
    Down,
    #[serde(rename = "mouseup")]
    Up,
}

impl EventKind {
    /// Button state after this event. Down always presses and Up always
    /// releases; a Move carries whatever the producer reported.
    #[must_use]
    pub fn pressed_after(self, reported: bool) -> bool {
        match self {
            Self::Move => reported,
            Self::Down => true,
            Self::Up => false,
        }
    }
}

/// One pointer sample from one participant.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorEvent {
    pub client_id: ClientId,
    pub kind: EventKind,
    pub position: Position,
    /// Button state at send time; true for the whole span between Down and Up.
    pub pressed: bool,
    /// Producer-side send time. Cosmetic only.
    pub timestamp: Option<Millis>,
}

impl CursorEvent {
    #[must_use]
    pub fn new(client_id: ClientId, kind: EventKind, position: Position, pressed: bool) -> Self {
        Self { client_id, kind, position, pressed, timestamp: None }
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: Millis) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// A decoded inbound payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Cursor(CursorEvent),
    /// The relay saw this participant's connection close.
    Part(ClientId),
}

impl Inbound {
    #[must_use]
    pub fn client_id(&self) -> &ClientId {
        match self {
            Self::Cursor(event) => &event.client_id,
            Self::Part(id) => id,
        }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("empty payload")]
    Empty,
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}` out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
    #[error("empty client id")]
    EmptyClientId,
}

impl ErrorCode for DecodeError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "E_DECODE_EMPTY",
            Self::Json(_) => "E_DECODE_JSON",
            Self::MissingField(_) => "E_DECODE_MISSING_FIELD",
            Self::OutOfRange { .. } => "E_DECODE_OUT_OF_RANGE",
            Self::EmptyClientId => "E_DECODE_CLIENT_ID",
        }
    }
}

// =============================================================================
// WIRE SHAPE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum WireKind {
    #[serde(rename = "mousemove")]
    Move,
    #[serde(rename = "mousedown")]
    Down,
    #[serde(rename = "mouseup")]
    Up,
    #[serde(rename = "part")]
    Part,
}

#[derive(Debug, Serialize, Deserialize)]
struct WirePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    y: Option<f64>,
    cid: String,
    #[serde(rename = "type")]
    kind: WireKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    md: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    t: Option<f64>,
}

impl From<&CursorEvent> for WirePayload {
    #[allow(clippy::cast_precision_loss)]
    fn from(event: &CursorEvent) -> Self {
        let kind = match event.kind {
            EventKind::Move => WireKind::Move,
            EventKind::Down => WireKind::Down,
            EventKind::Up => WireKind::Up,
        };
        Self {
            x: Some(event.position.x),
            y: Some(event.position.y),
            cid: event.client_id.as_str().to_owned(),
            kind,
            md: Some(event.pressed),
            t: event.timestamp.map(|t| t as f64),
        }
    }
}

impl TryFrom<WirePayload> for Inbound {
    type Error = DecodeError;

    #[allow(clippy::cast_possible_truncation)]
    fn try_from(wire: WirePayload) -> Result<Self, Self::Error> {
        if wire.cid.is_empty() {
            return Err(DecodeError::EmptyClientId);
        }
        let client_id = ClientId::from(wire.cid);

        let kind = match wire.kind {
            WireKind::Part => return Ok(Self::Part(client_id)),
            WireKind::Move => EventKind::Move,
            WireKind::Down => EventKind::Down,
            WireKind::Up => EventKind::Up,
        };

        let x = check_unit("x", wire.x.ok_or(DecodeError::MissingField("x"))?)?;
        let y = check_unit("y", wire.y.ok_or(DecodeError::MissingField("y"))?)?;
        let pressed = wire.md.ok_or(DecodeError::MissingField("md"))?;
        let timestamp = wire.t.filter(|t| t.is_finite()).map(|t| t.round() as Millis);

        Ok(Self::Cursor(CursorEvent { client_id, kind, position: Position { x, y }, pressed, timestamp }))
    }
}

// =============================================================================
// CODEC
// =============================================================================

/// Encode a cursor event as a JSON text payload.
#[must_use]
pub fn encode(event: &CursorEvent) -> String {
    // Serializing a flat struct of numbers, bools and strings cannot fail.
    serde_json::to_string(&WirePayload::from(event)).unwrap_or_default()
}

/// Encode a departure notice for `client_id`.
#[must_use]
pub fn encode_part(client_id: &ClientId) -> String {
    let wire = WirePayload {
        x: None,
        y: None,
        cid: client_id.as_str().to_owned(),
        kind: WireKind::Part,
        md: None,
        t: None,
    };
    serde_json::to_string(&wire).unwrap_or_default()
}

/// Re-encode a decoded payload in canonical form (no framing noise).
#[must_use]
pub fn encode_inbound(inbound: &Inbound) -> String {
    match inbound {
        Inbound::Cursor(event) => encode(event),
        Inbound::Part(id) => encode_part(id),
    }
}

/// Decode one inbound text payload.
///
/// Only the first JSON value is read; anything after it is ignored.
///
/// # Errors
///
/// Returns a [`DecodeError`] for empty input, malformed JSON, missing or
/// out-of-range fields. Callers drop the message and keep going.
pub fn decode(payload: &str) -> Result<Inbound, DecodeError> {
    let mut stream = serde_json::Deserializer::from_str(payload).into_iter::<WirePayload>();
    match stream.next() {
        Some(Ok(wire)) => Inbound::try_from(wire),
        Some(Err(e)) => Err(DecodeError::Json(e)),
        None => Err(DecodeError::Empty),
    }
}

#[cfg(test)]
#[path = "protocol_test.rs"]
mod tests;
