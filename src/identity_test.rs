use super::*;

// =============================================================================
// ClientId
// =============================================================================

#[test]
fn generate_has_prefix_and_hex_suffix() {
    let id = ClientId::generate();
    let suffix = id.as_str().strip_prefix("client-").expect("prefix");
    assert_eq!(suffix.len(), CLIENT_ID_BYTES * 2);
    assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn generate_two_calls_differ() {
    assert_ne!(ClientId::generate(), ClientId::generate());
}

#[test]
fn display_matches_inner_string() {
    let id = ClientId::from("client-abc");
    assert_eq!(id.to_string(), "client-abc");
}

#[test]
fn serializes_as_plain_string() {
    let id = ClientId::from("client-abc");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"client-abc\"");
    let back: ClientId = serde_json::from_str("\"client-abc\"").unwrap();
    assert_eq!(back, id);
}

#[test]
fn bytes_to_hex_leading_zero() {
    assert_eq!(bytes_to_hex(&[0x0a, 0xff]), "0aff");
}

// =============================================================================
// Identity
// =============================================================================

#[test]
fn identity_recognises_current_id() {
    let identity = Identity::with_id(ClientId::from("client-me"));
    assert!(identity.is_self(&ClientId::from("client-me")));
    assert!(!identity.is_self(&ClientId::from("client-other")));
}

#[test]
fn rotate_changes_current_and_keeps_old_as_self() {
    let mut identity = Identity::with_id(ClientId::from("client-me"));
    let fresh = identity.rotate().clone();
    assert_ne!(fresh, ClientId::from("client-me"));
    assert_eq!(identity.current(), &fresh);
    assert!(identity.is_self(&ClientId::from("client-me")));
    assert!(identity.is_self(&fresh));
}

#[test]
fn rotate_forgets_oldest_retired_ids() {
    let mut identity = Identity::with_id(ClientId::from("client-first"));
    for _ in 0..=MAX_RETIRED_IDS {
        identity.rotate();
    }
    assert!(!identity.is_self(&ClientId::from("client-first")));
    assert_eq!(identity.retired.len(), MAX_RETIRED_IDS);
}
