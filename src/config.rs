//! Command-line and environment configuration.
//!
//! Every knob has a long flag and an environment variable fallback. Raw
//! arguments are validated once into typed configs; nothing else in the
//! crate reads the environment.

use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::trail::{Palette, Viewport};

pub const DEFAULT_LIVENESS_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_SWEEP_PERIOD_MS: u64 = 500;
pub const DEFAULT_EMIT_STRIDE: u32 = 1;
pub const DEFAULT_RELAY_URL: &str = "ws://127.0.0.1:3000/ws";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_PEER_QUEUE: usize = 256;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("viewport must be positive, got {width}x{height}")]
    InvalidViewport { width: String, height: String },
    #[error("relay url must start with ws:// or wss://, got {0}")]
    InvalidUrl(String),
}

// =============================================================================
// CLI
// =============================================================================

#[derive(Parser, Debug)]
#[command(name = "cursorboard", about = "Shared live cursor canvas: broadcast relay and headless client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the broadcast relay.
    Relay(RelayArgs),
    /// Join a relay and track presence; local input is read from stdin.
    Join(ClientArgs),
}

#[derive(Args, Debug, Clone)]
pub struct PresenceArgs {
    /// Silence after which a peer is evicted.
    #[arg(long, env = "CURSORBOARD_LIVENESS_TIMEOUT_MS", default_value_t = DEFAULT_LIVENESS_TIMEOUT_MS)]
    pub liveness_timeout_ms: u64,

    /// How often stale peers are swept.
    #[arg(long, env = "CURSORBOARD_SWEEP_PERIOD_MS", default_value_t = DEFAULT_SWEEP_PERIOD_MS)]
    pub sweep_period_ms: u64,

    /// Send every Nth local move event.
    #[arg(long, env = "CURSORBOARD_EMIT_STRIDE", default_value_t = DEFAULT_EMIT_STRIDE)]
    pub emit_stride: u32,
}

#[derive(Args, Debug, Clone)]
pub struct ClientArgs {
    #[arg(long, env = "CURSORBOARD_URL", default_value = DEFAULT_RELAY_URL)]
    pub url: String,

    #[arg(long, env = "CURSORBOARD_VIEWPORT_WIDTH", default_value_t = 1280.0)]
    pub viewport_width: f64,

    #[arg(long, env = "CURSORBOARD_VIEWPORT_HEIGHT", default_value_t = 800.0)]
    pub viewport_height: f64,

    /// Use the dark colour scheme for trails.
    #[arg(long, env = "CURSORBOARD_DARK")]
    pub dark: bool,

    #[arg(long, env = "CURSORBOARD_PREFS_FILE", default_value = ".cursorboard.json")]
    pub prefs_file: PathBuf,

    #[command(flatten)]
    pub presence: PresenceArgs,
}

#[derive(Args, Debug, Clone)]
pub struct RelayArgs {
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Outbound queue depth per connected peer.
    #[arg(long, env = "CURSORBOARD_PEER_QUEUE", default_value_t = DEFAULT_PEER_QUEUE)]
    pub peer_queue: usize,
}

// =============================================================================
// TYPED CONFIG
// =============================================================================

/// Timing and throughput knobs of the presence core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceConfig {
    pub liveness_timeout: Duration,
    pub sweep_period: Duration,
    pub emit_stride: NonZeroU32,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            liveness_timeout: Duration::from_millis(DEFAULT_LIVENESS_TIMEOUT_MS),
            sweep_period: Duration::from_millis(DEFAULT_SWEEP_PERIOD_MS),
            emit_stride: NonZeroU32::MIN,
        }
    }
}

impl TryFrom<&PresenceArgs> for PresenceConfig {
    type Error = ConfigError;

    fn try_from(args: &PresenceArgs) -> Result<Self, Self::Error> {
        if args.liveness_timeout_ms == 0 {
            return Err(ConfigError::Zero("liveness timeout"));
        }
        if args.sweep_period_ms == 0 {
            return Err(ConfigError::Zero("sweep period"));
        }
        let emit_stride = NonZeroU32::new(args.emit_stride).ok_or(ConfigError::Zero("emit stride"))?;
        Ok(Self {
            liveness_timeout: Duration::from_millis(args.liveness_timeout_ms),
            sweep_period: Duration::from_millis(args.sweep_period_ms),
            emit_stride,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub url: String,
    pub viewport: Viewport,
    pub palette: Palette,
    pub prefs_file: PathBuf,
    pub presence: PresenceConfig,
}

impl TryFrom<&ClientArgs> for ClientConfig {
    type Error = ConfigError;

    fn try_from(args: &ClientArgs) -> Result<Self, Self::Error> {
        if !(args.url.starts_with("ws://") || args.url.starts_with("wss://")) {
            return Err(ConfigError::InvalidUrl(args.url.clone()));
        }
        let viewport = checked_viewport(args.viewport_width, args.viewport_height)?;
        Ok(Self {
            url: args.url.clone(),
            viewport,
            palette: Palette::for_scheme(args.dark),
            prefs_file: args.prefs_file.clone(),
            presence: PresenceConfig::try_from(&args.presence)?,
        })
    }
}

/// Viewport extents must be finite and positive.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidViewport`] otherwise.
pub fn checked_viewport(width: f64, height: f64) -> Result<Viewport, ConfigError> {
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if valid(width) && valid(height) {
        Ok(Viewport::new(width, height))
    } else {
        Err(ConfigError::InvalidViewport { width: width.to_string(), height: height.to_string() })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayConfig {
    pub port: u16,
    pub peer_queue: usize,
}

impl TryFrom<&RelayArgs> for RelayConfig {
    type Error = ConfigError;

    fn try_from(args: &RelayArgs) -> Result<Self, Self::Error> {
        if args.peer_queue == 0 {
            return Err(ConfigError::Zero("peer queue"));
        }
        Ok(Self { port: args.port, peer_queue: args.peer_queue })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
