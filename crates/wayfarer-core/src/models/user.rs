//! Users and caller identity.
//!
//! Authentication is external; this service receives a verified [`Caller`]
//! with every operation and never consults ambient session state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;

/// User role for authorization
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Customer,
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Customer => write!(f, "customer"),
        }
    }
}

/// A registered user record, as seen through the user directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// The verified identity of the caller of an operation.
///
/// `email` comes from the token claim when present; when absent, the access
/// check resolves it through the user directory before falling back to the
/// owner-by-email comparison.
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub role: Role,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_flag_follows_role() {
        let admin = Caller {
            user_id: Uuid::new_v4(),
            email: None,
            role: Role::Admin,
        };
        let customer = Caller {
            user_id: Uuid::new_v4(),
            email: Some("c@example.com".to_string()),
            role: Role::Customer,
        };
        assert!(admin.is_admin());
        assert!(!customer.is_admin());
    }
}
