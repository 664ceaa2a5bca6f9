//! Durable persistence for the session across process restarts.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::session::Session;

/// Storage key holding the token, written verbatim.
const TOKEN_KEY: &str = "auth_token";

/// Storage key holding the profile, serialized as JSON.
const PROFILE_KEY: &str = "auth_user";

/// Key-value persistence for the session token and user profile.
///
/// Each logical key lives in its own file under `data_dir`. There is no
/// atomicity across the two keys; `load` refuses to produce a half-session.
#[derive(Debug, Clone)]
pub struct TokenStore {
    data_dir: PathBuf,
}

impl TokenStore {
    /// Create a store rooted at `data_dir`. No I/O happens until the first
    /// `load`, `save`, or `clear`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(key)
    }

    /// Read the persisted session. Never fails: a missing token, an empty
    /// token, a missing profile, or a profile that does not parse all read as
    /// logged out.
    pub fn load(&self) -> Session {
        let token = match std::fs::read_to_string(self.key_path(TOKEN_KEY)) {
            Ok(token) if !token.is_empty() => token,
            Ok(_) => {
                debug!("Stored token is empty; treating as logged out");
                return Session::Anonymous;
            }
            Err(e) => {
                debug!(error = %e, "No stored session");
                return Session::Anonymous;
            }
        };

        let raw_profile = match std::fs::read_to_string(self.key_path(PROFILE_KEY)) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Stored token has no profile; treating as logged out");
                return Session::Anonymous;
            }
        };

        match serde_json::from_str(&raw_profile) {
            Ok(profile) => {
                debug!("Restored persisted session");
                Session::Authenticated { token, profile }
            }
            Err(e) => {
                warn!(error = %e, "Stored profile is corrupt; treating as logged out");
                Session::Anonymous
            }
        }
    }

    /// Persist a session, token first. Callers clear rather than save an
    /// empty session; passing `Session::Anonymous` or an empty token is an
    /// error, since `load` reads both back as logged out.
    pub fn save(&self, session: &Session) -> Result<()> {
        let Session::Authenticated { token, profile } = session else {
            anyhow::bail!("An empty session is cleared, not saved");
        };
        if token.is_empty() {
            anyhow::bail!("Refusing to save an empty token");
        }

        std::fs::create_dir_all(&self.data_dir).with_context(|| {
            format!(
                "Failed to create session directory {}",
                self.data_dir.display()
            )
        })?;

        std::fs::write(self.key_path(TOKEN_KEY), token)
            .context("Failed to write session token")?;

        let serialized = serde_json::to_string_pretty(profile)?;
        std::fs::write(self.key_path(PROFILE_KEY), serialized)
            .context("Failed to write user profile")?;

        Ok(())
    }

    /// Remove both keys. Missing entries are fine; any other removal error is
    /// logged and swallowed so logout cannot fail.
    pub fn clear(&self) {
        for key in [TOKEN_KEY, PROFILE_KEY] {
            if let Err(e) = std::fs::remove_file(self.key_path(key)) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(key, error = %e, "Failed to remove stored session entry");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample_session() -> Session {
        Session::Authenticated {
            token: "tok-123".into(),
            profile: json!({"id": 1, "name": "Alice"}),
        }
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path());

        let session = sample_session();
        store.save(&session).unwrap();
        assert_eq!(store.load(), session);
    }

    #[test]
    fn test_load_empty_store() {
        let dir = TempDir::new().unwrap();
        assert_eq!(TokenStore::new(dir.path()).load(), Session::Anonymous);
    }

    #[test]
    fn test_corrupt_profile_degrades_to_anonymous() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("auth_token"), "tok-123").unwrap();
        std::fs::write(dir.path().join("auth_user"), "{not json").unwrap();

        assert_eq!(TokenStore::new(dir.path()).load(), Session::Anonymous);
    }

    #[test]
    fn test_token_without_profile_degrades_to_anonymous() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("auth_token"), "tok-123").unwrap();

        assert_eq!(TokenStore::new(dir.path()).load(), Session::Anonymous);
    }

    #[test]
    fn test_empty_token_degrades_to_anonymous() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("auth_token"), "").unwrap();
        std::fs::write(dir.path().join("auth_user"), "{}").unwrap();

        assert_eq!(TokenStore::new(dir.path()).load(), Session::Anonymous);
    }

    #[test]
    fn test_clear_removes_both_keys() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path());
        store.save(&sample_session()).unwrap();

        store.clear();
        assert_eq!(store.load(), Session::Anonymous);
        assert!(!dir.path().join("auth_token").exists());
        assert!(!dir.path().join("auth_user").exists());
    }

    #[test]
    fn test_clear_empty_store() {
        let dir = TempDir::new().unwrap();
        TokenStore::new(dir.path()).clear();
    }

    #[test]
    fn test_save_anonymous_refused() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path());

        assert!(store.save(&Session::Anonymous).is_err());
        assert_eq!(store.load(), Session::Anonymous);
    }

    #[test]
    fn test_save_empty_token_refused() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path());

        // An empty token would read back as logged out, so save must not
        // accept it.
        let session = Session::Authenticated {
            token: String::new(),
            profile: json!({"id": 1}),
        };
        assert!(store.save(&session).is_err());
        assert_eq!(store.load(), Session::Anonymous);
    }

    #[test]
    fn test_save_fails_when_dir_creation_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let store = TokenStore::new(blocker.join("store"));
        assert!(store.save(&sample_session()).is_err());
    }
}
