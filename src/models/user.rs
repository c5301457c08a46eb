use serde::{Deserialize, Serialize};
use strum::EnumString;

/// Closed role set. Every authorization decision matches exhaustively on
/// this enum so a newly added role cannot silently fall through to
/// "allowed".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Admin,
    Driver,
    Accountant,
    /// Read-only client-facing role. Its upstream capabilities are not
    /// fully defined; the guard denies all mutations for it.
    ClientViewer,
}

/// The requesting user, passed explicitly into every permission and
/// transition decision instead of being read from ambient session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i64,
    pub role: Role,
}

impl Actor {
    pub fn new(id: i64, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// A driver as returned by the collaborator's user listing; input to the
/// load-balance suggester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverProfile {
    pub id: i64,
    pub name: String,
}
