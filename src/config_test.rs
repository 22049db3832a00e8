use super::*;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).expect("cli should parse")
}

fn presence_args(timeout: u64, sweep: u64, stride: u32) -> PresenceArgs {
    PresenceArgs { liveness_timeout_ms: timeout, sweep_period_ms: sweep, emit_stride: stride }
}

#[test]
fn presence_defaults_match_protocol_constants() {
    let config = PresenceConfig::default();
    assert_eq!(config.liveness_timeout, Duration::from_millis(5000));
    assert_eq!(config.sweep_period, Duration::from_millis(500));
    assert_eq!(config.emit_stride.get(), 1);
}

#[test]
fn presence_args_convert() {
    let config = PresenceConfig::try_from(&presence_args(8000, 250, 3)).unwrap();
    assert_eq!(config.liveness_timeout, Duration::from_secs(8));
    assert_eq!(config.sweep_period, Duration::from_millis(250));
    assert_eq!(config.emit_stride.get(), 3);
}

#[test]
fn presence_args_reject_zero_values() {
    assert_eq!(
        PresenceConfig::try_from(&presence_args(0, 500, 1)),
        Err(ConfigError::Zero("liveness timeout"))
    );
    assert_eq!(PresenceConfig::try_from(&presence_args(5000, 0, 1)), Err(ConfigError::Zero("sweep period")));
    assert_eq!(PresenceConfig::try_from(&presence_args(5000, 500, 0)), Err(ConfigError::Zero("emit stride")));
}

#[test]
fn join_uses_defaults() {
    let Command::Join(args) = parse(&["cursorboard", "join"]).command else {
        panic!("expected join");
    };
    let config = ClientConfig::try_from(&args).unwrap();
    assert_eq!(config.url, DEFAULT_RELAY_URL);
    assert_eq!(config.viewport, Viewport::new(1280.0, 800.0));
    assert_eq!(config.palette, Palette::LIGHT);
    assert_eq!(config.presence, PresenceConfig::default());
}

#[test]
fn join_accepts_overrides() {
    let cli = parse(&[
        "cursorboard",
        "join",
        "--url",
        "wss://example.test/ws",
        "--viewport-width",
        "640",
        "--viewport-height",
        "480",
        "--dark",
        "--emit-stride",
        "4",
    ]);
    let Command::Join(args) = cli.command else {
        panic!("expected join");
    };
    let config = ClientConfig::try_from(&args).unwrap();
    assert_eq!(config.url, "wss://example.test/ws");
    assert_eq!(config.viewport, Viewport::new(640.0, 480.0));
    assert_eq!(config.palette, Palette::DARK);
    assert_eq!(config.presence.emit_stride.get(), 4);
}

#[test]
fn join_rejects_http_url() {
    let Command::Join(args) = parse(&["cursorboard", "join", "--url", "http://example.test"]).command else {
        panic!("expected join");
    };
    assert!(matches!(ClientConfig::try_from(&args), Err(ConfigError::InvalidUrl(_))));
}

#[test]
fn checked_viewport_rejects_non_positive_extents() {
    assert!(checked_viewport(0.0, 100.0).is_err());
    assert!(checked_viewport(100.0, -1.0).is_err());
    assert!(checked_viewport(f64::NAN, 100.0).is_err());
    assert_eq!(checked_viewport(10.0, 20.0), Ok(Viewport::new(10.0, 20.0)));
}

#[test]
fn relay_parses_port_and_queue() {
    let Command::Relay(args) = parse(&["cursorboard", "relay", "--port", "4000", "--peer-queue", "32"]).command else {
        panic!("expected relay");
    };
    assert_eq!(RelayConfig::try_from(&args), Ok(RelayConfig { port: 4000, peer_queue: 32 }));
}

#[test]
fn relay_rejects_zero_queue() {
    let args = RelayArgs { port: 3000, peer_queue: 0 };
    assert_eq!(RelayConfig::try_from(&args), Err(ConfigError::Zero("peer queue")));
}
