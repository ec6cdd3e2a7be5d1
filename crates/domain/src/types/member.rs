//! Member types
//!
//! Members are owned by the out-of-scope membership system; the synchronizer
//! only reads them for authentication and role checks.

use serde::{Deserialize, Serialize};

/// A club member as stored in the local database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: MemberRole,
}

impl Member {
    /// Whether this member may run administrative operations such as a sync
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Role assigned to a member
///
/// The membership system stores roles as free text; the four admin-equivalent
/// spellings are kept distinct to match what it writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemberRole {
    SuperAdmin,
    Admin,
    Administrator,
    Director,
    SectionLeader,
    Member,
}

impl MemberRole {
    /// Parse the database text form; unknown roles are treated as `Member`
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "super-admin" | "superadmin" | "super_admin" => Self::SuperAdmin,
            "admin" => Self::Admin,
            "administrator" => Self::Administrator,
            "director" => Self::Director,
            "section-leader" | "section_leader" => Self::SectionLeader,
            _ => Self::Member,
        }
    }

    /// Stable text form used in the database
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "super-admin",
            Self::Admin => "admin",
            Self::Administrator => "administrator",
            Self::Director => "director",
            Self::SectionLeader => "section-leader",
            Self::Member => "member",
        }
    }

    /// Admin-equivalent roles may manage events and run syncs
    pub fn is_admin(self) -> bool {
        matches!(self, Self::SuperAdmin | Self::Admin | Self::Administrator | Self::Director)
    }
}
