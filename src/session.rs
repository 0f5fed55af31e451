//! Session context and route guard.
//!
//! The session is an explicit value handed to every protected operation. It
//! records whether the backend last accepted our cookies, and is refreshed by
//! probing the backend rather than trusted indefinitely.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::{BoardClient, ClientError};
use crate::models::LoginInput;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Not logged in; run `taskmap login` first")]
    LoginRequired,

    #[error("Failed to access session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt session file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Authentication state for one user of one backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionContext {
    pub authenticated: bool,
    /// Session cookies as a `Cookie` header value.
    #[serde(default)]
    pub cookies: Option<String>,
    /// When the backend last confirmed or denied the session.
    #[serde(default)]
    pub checked_at: Option<DateTime<Utc>>,
}

impl SessionContext {
    /// Route guard: protected operations call this before touching the backend.
    pub fn require(&self) -> Result<(), SessionError> {
        if self.authenticated {
            Ok(())
        } else {
            Err(SessionError::LoginRequired)
        }
    }

    /// Forget the session after the backend rejected it.
    pub fn invalidate(&mut self) {
        if self.authenticated {
            tracing::warn!("backend rejected the session; login required");
        }
        self.authenticated = false;
        self.cookies = None;
        self.checked_at = Some(Utc::now());
    }

    /// Invalidate the session if `error` is a 401/403. Returns whether it was.
    pub fn observe(&mut self, error: &ClientError) -> bool {
        if error.is_auth_failure() {
            self.invalidate();
            true
        } else {
            false
        }
    }

    /// Load cookies from this context into the client's jar.
    pub fn attach(&self, client: &BoardClient) {
        if let Some(cookies) = &self.cookies {
            client.restore_cookies(cookies);
        }
    }

    /// Log in and capture the issued session cookies.
    pub async fn login(client: &BoardClient, input: &LoginInput) -> Result<Self, SessionError> {
        client.login(input).await?;
        tracing::info!(email = %input.email, "logged in");
        Ok(Self {
            authenticated: true,
            cookies: client.export_cookies(),
            checked_at: Some(Utc::now()),
        })
    }

    /// Ask the backend whether the session is still valid and record the answer.
    pub async fn refresh(
        &mut self,
        client: &BoardClient,
        probe_path: &str,
    ) -> Result<bool, SessionError> {
        if self.cookies.is_none() && !self.authenticated {
            return Ok(false);
        }
        self.attach(client);
        let valid = client.check_session(probe_path).await?;
        if valid {
            self.authenticated = true;
            self.cookies = client.export_cookies().or_else(|| self.cookies.take());
            self.checked_at = Some(Utc::now());
        } else {
            self.invalidate();
        }
        Ok(valid)
    }
}

/// JSON file holding the persisted [`SessionContext`].
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored session. A missing file is an anonymous session.
    pub fn load(&self) -> Result<SessionContext, SessionError> {
        if !self.path.exists() {
            return Ok(SessionContext::default());
        }
        let content = fs::read_to_string(&self.path).map_err(|source| SessionError::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| SessionError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    pub fn save(&self, session: &SessionContext) -> Result<(), SessionError> {
        let io_err = |source| SessionError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = serde_json::to_string_pretty(session).map_err(|source| {
            SessionError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, content).map_err(io_err)
    }

    /// Remove the stored session. Missing files are fine.
    pub fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SessionError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_rejects_anonymous_session() {
        let session = SessionContext::default();
        assert!(matches!(session.require(), Err(SessionError::LoginRequired)));
    }

    #[test]
    fn forbidden_invalidates_but_not_found_does_not() {
        let mut session = SessionContext {
            authenticated: true,
            cookies: Some("sid=1".into()),
            checked_at: None,
        };

        assert!(!session.observe(&ClientError::NotFound("task".into())));
        assert!(session.require().is_ok());

        assert!(session.observe(&ClientError::Forbidden));
        assert!(session.require().is_err());
        assert!(session.cookies.is_none());
    }

    #[test]
    fn store_round_trips_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested").join("session.json"));

        assert_eq!(store.load().unwrap(), SessionContext::default());

        let session = SessionContext {
            authenticated: true,
            cookies: Some("sid=abc".into()),
            checked_at: None,
        };
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), session);

        store.clear().unwrap();
        store.clear().unwrap();
        assert!(!store.load().unwrap().authenticated);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let err = SessionStore::new(&path).load().unwrap_err();
        assert!(matches!(err, SessionError::Corrupt { .. }));
    }
}
