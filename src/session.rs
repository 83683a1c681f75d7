use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("User '{0}' already exists")]
    UserAlreadyExists(String),
    #[error("Username and password must not be empty")]
    EmptyCredentials,
    #[error("Authentication failed")]
    AuthenticationFailed,
    #[error("Session {0} not found")]
    SessionNotFound(Uuid),
}

/// An authenticated session. `user_id` is the tenant key for every table
/// operation issued through it; `session_id` is a random token.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Session {
    pub session_id: Uuid,
    pub user_id: u64,
    /// Unix time in seconds after which the session is no longer valid.
    pub expiration_time: u64,
}

impl Session {
    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.expiration_time
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct User {
    pub user_id: u64,
    pub username: String,
    /// SHA-256 of the password, hex encoded
    pub password_hash: String,
}

impl User {
    pub fn hash_password(password: &str) -> String {
        hex::encode(Sha256::digest(password.as_bytes()))
    }

    pub fn verify_password(&self, password: &str) -> bool {
        self.password_hash == Self::hash_password(password)
    }
}

/// Registered users. Persisted with the tables, since user ids own them.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UserRegistry {
    users: HashMap<String, User>,
    next_user_id: u64,
}

impl Default for UserRegistry {
    fn default() -> Self {
        UserRegistry {
            users: HashMap::new(),
            next_user_id: 1,
        }
    }
}

impl UserRegistry {
    /// Registers a user and returns its id.
    pub fn sign_up(&mut self, username: &str, password: &str) -> Result<u64, SessionError> {
        if username.is_empty() || password.is_empty() {
            return Err(SessionError::EmptyCredentials);
        }
        if self.users.contains_key(username) {
            return Err(SessionError::UserAlreadyExists(username.to_string()));
        }
        let user_id = self.next_user_id;
        self.next_user_id += 1;
        self.users.insert(
            username.to_string(),
            User {
                user_id,
                username: username.to_string(),
                password_hash: User::hash_password(password),
            },
        );
        info!(user_id, username, "registered user");
        Ok(user_id)
    }

    /// Returns the user id when the credentials match.
    pub fn verify(&self, username: &str, password: &str) -> Result<u64, SessionError> {
        self.users
            .get(username)
            .filter(|u| u.verify_password(password))
            .map(|u| u.user_id)
            .ok_or(SessionError::AuthenticationFailed)
    }

    /// Makes sure ids up to `user_id` are never handed out again.
    pub fn reserve_through(&mut self, user_id: u64) {
        self.next_user_id = self.next_user_id.max(user_id.saturating_add(1));
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Live sessions. Not persisted: a restart signs everybody out.
#[derive(Debug)]
pub struct SessionManager {
    sessions: HashMap<Uuid, Session>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(ttl: Duration) -> Self {
        SessionManager {
            sessions: HashMap::new(),
            ttl,
        }
    }

    /// Opens a session for an already authenticated user.
    pub fn open(&mut self, user_id: u64) -> Session {
        self.open_at(user_id, unix_now())
    }

    pub fn open_at(&mut self, user_id: u64, now: u64) -> Session {
        let session = Session {
            session_id: Uuid::new_v4(),
            user_id,
            expiration_time: now.saturating_add(self.ttl.as_secs()),
        };
        self.sessions.insert(session.session_id, session);
        debug!(session_id = %session.session_id, user_id, "opened session");
        session
    }

    pub fn sign_out(&mut self, session_id: Uuid) -> Result<(), SessionError> {
        self.sessions
            .remove(&session_id)
            .map(|_| ())
            .ok_or(SessionError::SessionNotFound(session_id))
    }

    /// Returns the session if it exists and has not expired.
    pub fn resolve(&self, session_id: Uuid) -> Option<Session> {
        self.resolve_at(session_id, unix_now())
    }

    pub fn resolve_at(&self, session_id: Uuid, now: u64) -> Option<Session> {
        self.sessions
            .get(&session_id)
            .copied()
            .filter(|s| !s.is_expired(now))
    }

    /// Returns `session` while it is live, otherwise a new session for the
    /// same user.
    pub fn refresh(&mut self, session: Session) -> Session {
        self.refresh_at(session, unix_now())
    }

    pub fn refresh_at(&mut self, session: Session, now: u64) -> Session {
        match self.resolve_at(session.session_id, now) {
            Some(live) => live,
            None => {
                self.sessions.remove(&session.session_id);
                self.open_at(session.user_id, now)
            }
        }
    }

    /// Drops expired sessions and returns how many were removed.
    pub fn sweep_expired(&mut self, now: u64) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| !s.is_expired(now));
        let removed = before - self.sessions.len();
        if removed > 0 {
            debug!(removed, "swept expired sessions");
        }
        removed
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(Duration::from_secs(3600))
    }
}
