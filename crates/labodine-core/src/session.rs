//! # Session Context
//!
//! The signed-in user, passed explicitly to every handler that needs it
//! instead of being looked up from ambient storage.
//!
//! ```text
//! POST /api/auth/login ──► LoginResponse { token, user } ──► Session
//!                                                              │
//!        handlers receive &Session ◄───────────────────────────┘
//!          • cashier_name()  → printed on receipts / checkout records
//!          • require(View)   → Admin-only pages
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};

/// Fallback cashier name when nobody is signed in.
pub const DEFAULT_CASHIER_NAME: &str = "Kasir";

/// Account category (kategori) returned by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Role {
    Admin,
    /// Employee. Accounts without a category are treated as employees.
    #[default]
    Pegawai,
}

/// A back-office page that may be restricted by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Dashboard,
    Members,
    /// Approving employee registrations.
    PendingUsers,
    Cashier,
    RawMaterials,
    Products,
    Income,
    Expenses,
    FinancialReport,
    Attendance,
}

impl View {
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            View::PendingUsers => &[Role::Admin],
            _ => &[Role::Admin, Role::Pegawai],
        }
    }
}

/// The authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub role: Role,
}

impl Session {
    pub fn new(
        token: impl Into<String>,
        username: impl Into<String>,
        role: Role,
    ) -> Result<Self, ValidationError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "token".to_string(),
            });
        }
        Ok(Session {
            token,
            username: username.into(),
            role,
        })
    }

    /// Name recorded as `kasir`; blank usernames fall back to `fallback`.
    pub fn cashier_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        let name = self.username.trim();
        if name.is_empty() {
            fallback
        } else {
            name
        }
    }

    pub fn can_access(&self, view: View) -> bool {
        view.allowed_roles().contains(&self.role)
    }

    pub fn require(&self, view: View) -> CoreResult<()> {
        if self.can_access(view) {
            Ok(())
        } else {
            Err(CoreError::Forbidden {
                role: self.role,
                view,
            })
        }
    }

    /// `Bearer <token>` for the Authorization header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Cashier name for an optional session.
pub fn cashier_name<'a>(session: Option<&'a Session>, fallback: &'a str) -> &'a str {
    session.map_or(fallback, |s| s.cashier_name(fallback))
}

// =============================================================================
// Login Response
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct LoginUser {
    #[serde(default)]
    pub username: String,
    #[serde(rename = "kategori", default)]
    pub role: Option<Role>,
}

/// Body of a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: LoginUser,
}

impl TryFrom<LoginResponse> for Session {
    type Error = ValidationError;

    fn try_from(res: LoginResponse) -> Result<Self, Self::Error> {
        Session::new(res.token, res.user.username, res.user.role.unwrap_or_default())
    }
}
