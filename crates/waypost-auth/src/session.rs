//! In-memory session state for the current user.
//!
//! This module provides:
//! - `Session`: the record of authentication status; a token never appears
//!   without its user profile
//! - `SessionState`: the process-wide shared handle that consumers read and
//!   the gateway writes

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

/// Authentication status of the running client.
///
/// A half-session (a token without a profile, or the reverse) is
/// unrepresentable: both travel together in the `Authenticated` variant.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Session {
    /// No user is logged in.
    #[default]
    Anonymous,
    /// A user is logged in.
    Authenticated {
        /// Opaque credential presented on authenticated requests.
        token: String,
        /// Application-defined user record, passed through verbatim from the
        /// identity endpoint.
        profile: Value,
    },
}

impl Session {
    /// Bearer token, if a user is logged in.
    pub fn token(&self) -> Option<&str> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated { token, .. } => Some(token),
        }
    }

    /// User profile, if a user is logged in.
    pub fn profile(&self) -> Option<&Value> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated { profile, .. } => Some(profile),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated { .. })
    }

    pub fn is_anonymous(&self) -> bool {
        !self.is_authenticated()
    }
}

/// Shared handle to the single authoritative session value.
///
/// Constructed once at startup and handed out by clone; clones share the same
/// cell, so there is one session per process. Writes propagate synchronously:
/// a reader observing the state after `set` returns sees the new value.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    inner: Arc<RwLock<Session>>,
}

impl SessionState {
    pub fn new(initial: Session) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    /// Snapshot of the current session.
    pub fn get(&self) -> Session {
        self.inner.read().clone()
    }

    /// Replace the current session.
    pub fn set(&self, session: Session) {
        *self.inner.write() = session;
    }

    /// Return to the anonymous state.
    pub fn clear(&self) {
        self.set(Session::Anonymous);
    }

    /// Whether a user is currently logged in.
    pub fn is_authenticated(&self) -> bool {
        self.inner.read().is_authenticated()
    }

    /// Current bearer token, if any.
    pub fn token(&self) -> Option<String> {
        self.inner.read().token().map(str::to_owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn logged_in() -> Session {
        Session::Authenticated {
            token: "tok".into(),
            profile: json!({"id": 1, "name": "Alice"}),
        }
    }

    #[test]
    fn test_token_and_profile_presence_agree() {
        let anon = Session::Anonymous;
        assert_eq!(anon.token().is_some(), anon.profile().is_some());
        assert!(anon.is_anonymous());

        let auth = logged_in();
        assert_eq!(auth.token().is_some(), auth.profile().is_some());
        assert!(auth.is_authenticated());
    }

    #[test]
    fn test_set_visible_immediately() {
        let state = SessionState::default();
        assert!(!state.is_authenticated());

        state.set(logged_in());
        assert!(state.is_authenticated());
        assert_eq!(state.token().as_deref(), Some("tok"));
    }

    #[test]
    fn test_clones_share_session() {
        let state = SessionState::default();
        let observer = state.clone();

        state.set(logged_in());
        assert!(observer.is_authenticated());

        observer.clear();
        assert_eq!(state.get(), Session::Anonymous);
    }
}
