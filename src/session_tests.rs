//! Tests for session state construction.

use super::*;

fn ada() -> Identity {
    Identity {
        id: "u-1".to_string(),
        name: "Ada".to_string(),
        email: "ada@x.com".to_string(),
    }
}

#[test]
fn signed_out_state_holds_nothing() {
    let state = SessionState::signed_out();
    assert_eq!(state.phase, SessionPhase::SignedOut);
    assert!(state.identity.is_none());
    assert!(state.token.is_none());
    assert!(!state.request_in_flight);
    assert!(state.last_error.is_none());
}

#[test]
fn startup_with_persisted_credentials_is_signed_in() {
    let state = SessionState::from_credentials(Some((ada(), "tok-1".to_string())));
    assert_eq!(state.phase, SessionPhase::SignedIn);
    assert_eq!(state.identity.as_ref().map(|i| i.email.as_str()), Some("ada@x.com"));
    assert_eq!(state.token.as_deref(), Some("tok-1"));
    assert!(state.is_signed_in());
}

#[test]
fn startup_without_credentials_is_signed_out() {
    let state = SessionState::from_credentials(None);
    assert_eq!(state.phase, SessionPhase::SignedOut);
    assert!(!state.is_signed_in());
}
