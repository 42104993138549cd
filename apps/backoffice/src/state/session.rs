//! # Session State
//!
//! Holds the signed-in user between commands. Commands never read it
//! implicitly: the caller takes a [`Session`] out with [`SessionState::require`]
//! and passes it down.

use std::sync::{PoisonError, RwLock};

use tracing::info;

use labodine_core::session::LoginResponse;
use labodine_core::{Session, ValidationError};

use crate::error::{ApiError, ErrorCode};

#[derive(Debug, Default)]
pub struct SessionState {
    current: RwLock<Option<Session>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the session built from a login response.
    pub fn sign_in(&self, response: LoginResponse) -> Result<Session, ValidationError> {
        let session = Session::try_from(response)?;
        info!(username = %session.username, role = ?session.role, "Signed in");
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(session)
    }

    pub fn sign_out(&self) {
        let previous = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(session) = previous {
            info!(username = %session.username, "Signed out");
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The current session, or `UNAUTHORIZED` when nobody is signed in.
    pub fn require(&self) -> Result<Session, ApiError> {
        self.current()
            .ok_or_else(|| ApiError::new(ErrorCode::Unauthorized, "Silakan login terlebih dahulu"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labodine_core::Role;

    #[test]
    fn test_sign_in_and_out() {
        let state = SessionState::new();
        assert_eq!(state.require().unwrap_err().code, ErrorCode::Unauthorized);

        let response: LoginResponse = serde_json::from_str(
            r#"{"token":"abc","user":{"username":"sinta","kategori":"Admin"}}"#,
        )
        .unwrap();
        let session = state.sign_in(response).unwrap();
        assert_eq!(session.role, Role::Admin);
        assert_eq!(state.require().unwrap().username, "sinta");

        state.sign_out();
        assert!(state.current().is_none());
    }

    #[test]
    fn test_sign_in_rejects_empty_token() {
        let state = SessionState::new();
        let response: LoginResponse =
            serde_json::from_str(r#"{"token":"","user":{"username":"x"}}"#).unwrap();
        assert!(state.sign_in(response).is_err());
        assert!(state.current().is_none());
    }
}
