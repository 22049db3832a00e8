//! Local input capture.
//!
//! The headless client reads one pointer action per line, in raw device
//! pixels, the way a host window would report them:
//!
//! ```text
//! move 320 200
//! down 320 200
//! up 330 210
//! resize 1024 768
//! optout
//! quit
//! ```
//!
//! Blank lines and `#` comments are skipped. Normalization against the
//! viewport happens in the session at capture time, not here.

use crate::protocol::EventKind;

/// One local action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocalInput {
    Pointer { kind: EventKind, x: f64, y: f64 },
    Resize { width: f64, height: f64 },
    /// Disable interactivity for this and future sessions.
    OptOut,
    /// Tear the session down.
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("`{command}` expects {expected} numeric arguments")]
    Arity { command: &'static str, expected: usize },
    #[error("not a number: {0}")]
    InvalidNumber(String),
}

/// Parse one input line. `Ok(None)` for blank lines and comments.
///
/// # Errors
///
/// Returns an [`InputError`] for unknown commands or bad arguments.
pub fn parse_line(line: &str) -> Result<Option<LocalInput>, InputError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut parts = line.split_whitespace();
    let Some(command) = parts.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = parts.collect();

    let input = match command.to_ascii_lowercase().as_str() {
        "move" => pointer(EventKind::Move, "move", &args)?,
        "down" => pointer(EventKind::Down, "down", &args)?,
        "up" => pointer(EventKind::Up, "up", &args)?,
        "resize" => {
            let (width, height) = pair("resize", &args)?;
            LocalInput::Resize { width, height }
        }
        "optout" => LocalInput::OptOut,
        "quit" | "exit" => LocalInput::Quit,
        other => return Err(InputError::UnknownCommand(other.to_owned())),
    };
    Ok(Some(input))
}

fn pointer(kind: EventKind, command: &'static str, args: &[&str]) -> Result<LocalInput, InputError> {
    let (x, y) = pair(command, args)?;
    Ok(LocalInput::Pointer { kind, x, y })
}

fn pair(command: &'static str, args: &[&str]) -> Result<(f64, f64), InputError> {
    let [a, b] = args else {
        return Err(InputError::Arity { command, expected: 2 });
    };
    Ok((number(a)?, number(b)?))
}

fn number(raw: &str) -> Result<f64, InputError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| InputError::InvalidNumber(raw.to_owned()))
}

#[cfg(test)]
#[path = "input_test.rs"]
mod tests;
