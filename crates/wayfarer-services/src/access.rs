//! Identity and access checks for bookings and dependants.
//!
//! A caller may read or mutate a booking when they are an admin, when the
//! booking's owner id matches theirs, or when their email matches the
//! booking's customer email. The email comes from the token claim when
//! present; otherwise it is resolved through the user directory. Every
//! application, document, and roster operation runs this check first.

use std::sync::Arc;

use wayfarer_core::models::{Booking, Caller, Dependant};
use wayfarer_core::AppError;
use wayfarer_db::UserDirectory;

#[derive(Clone)]
pub struct AccessPolicy {
    users: Arc<dyn UserDirectory>,
}

impl AccessPolicy {
    pub fn new(users: Arc<dyn UserDirectory>) -> Self {
        Self { users }
    }

    /// Resolve the caller's email: token claim first, user directory second.
    async fn caller_email(&self, caller: &Caller) -> Result<Option<String>, AppError> {
        if let Some(email) = &caller.email {
            return Ok(Some(email.clone()));
        }
        Ok(self
            .users
            .find_by_id(caller.user_id)
            .await?
            .map(|user| user.email))
    }

    /// Whether the caller may read or mutate this booking.
    pub async fn can_access_booking(
        &self,
        caller: &Caller,
        booking: &Booking,
    ) -> Result<bool, AppError> {
        if caller.is_admin() {
            return Ok(true);
        }
        if booking.user_id == Some(caller.user_id) {
            return Ok(true);
        }
        let email = self.caller_email(caller).await?;
        Ok(email.is_some_and(|e| e == booking.customer_email))
    }

    /// Whether the caller may read or mutate this dependant: admin, or the
    /// dependant's owning user.
    pub fn can_access_dependant(&self, caller: &Caller, dependant: &Dependant) -> bool {
        caller.is_admin() || dependant.user_id == caller.user_id
    }

    /// [`Self::can_access_booking`], surfaced as Forbidden on failure.
    pub async fn authorize_booking(
        &self,
        caller: &Caller,
        booking: &Booking,
    ) -> Result<(), AppError> {
        if self.can_access_booking(caller, booking).await? {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "You do not have access to this booking".to_string(),
            ))
        }
    }

    /// [`Self::can_access_dependant`], surfaced as Forbidden on failure.
    pub fn authorize_dependant(
        &self,
        caller: &Caller,
        dependant: &Dependant,
    ) -> Result<(), AppError> {
        if self.can_access_dependant(caller, dependant) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "You do not have access to this dependant".to_string(),
            ))
        }
    }

    /// Admin-only actions (review, close/reopen).
    pub fn require_admin(&self, caller: &Caller) -> Result<(), AppError> {
        if caller.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "This action requires an administrator".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{fixtures, InMemoryUserDirectory};
    use uuid::Uuid;
    use wayfarer_core::models::Role;

    fn policy_with(users: InMemoryUserDirectory) -> AccessPolicy {
        AccessPolicy::new(Arc::new(users))
    }

    #[tokio::test]
    async fn admin_always_passes() {
        let policy = policy_with(InMemoryUserDirectory::default());
        let booking = fixtures::paid_booking(2);
        let admin = Caller {
            user_id: Uuid::new_v4(),
            email: None,
            role: Role::Admin,
        };
        assert!(policy.can_access_booking(&admin, &booking).await.unwrap());
    }

    #[tokio::test]
    async fn owner_by_id_passes() {
        let policy = policy_with(InMemoryUserDirectory::default());
        let booking = fixtures::paid_booking(2);
        let owner = Caller {
            user_id: booking.user_id.unwrap(),
            email: None,
            role: Role::Customer,
        };
        assert!(policy.can_access_booking(&owner, &booking).await.unwrap());
    }

    #[tokio::test]
    async fn owner_by_email_claim_passes() {
        let policy = policy_with(InMemoryUserDirectory::default());
        let booking = fixtures::paid_booking(2);
        let caller = Caller {
            user_id: Uuid::new_v4(),
            email: Some(booking.customer_email.clone()),
            role: Role::Customer,
        };
        assert!(policy.can_access_booking(&caller, &booking).await.unwrap());
    }

    #[tokio::test]
    async fn missing_email_claim_falls_back_to_directory() {
        let users = InMemoryUserDirectory::default();
        let booking = fixtures::paid_booking(2);
        let user = fixtures::user(Role::Customer, &booking.customer_email);
        let caller = Caller {
            user_id: user.id,
            email: None,
            role: Role::Customer,
        };
        users.add(user);

        let policy = policy_with(users);
        assert!(policy.can_access_booking(&caller, &booking).await.unwrap());
    }

    #[tokio::test]
    async fn stranger_is_forbidden() {
        let policy = policy_with(InMemoryUserDirectory::default());
        let booking = fixtures::paid_booking(2);
        let stranger = Caller {
            user_id: Uuid::new_v4(),
            email: Some("someone.else@example.com".to_string()),
            role: Role::Customer,
        };
        assert!(!policy.can_access_booking(&stranger, &booking).await.unwrap());
        let err = policy.authorize_booking(&stranger, &booking).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn dependant_check_is_admin_or_owner_only() {
        let policy = policy_with(InMemoryUserDirectory::default());
        let booking = fixtures::paid_booking(2);
        let dependant = fixtures::dependant(&booking, "Jane Doe", "Spouse");

        let owner = Caller {
            user_id: dependant.user_id,
            email: None,
            role: Role::Customer,
        };
        assert!(policy.can_access_dependant(&owner, &dependant));

        // matching email is NOT enough for a dependant
        let by_email = Caller {
            user_id: Uuid::new_v4(),
            email: Some(booking.customer_email.clone()),
            role: Role::Customer,
        };
        assert!(!policy.can_access_dependant(&by_email, &dependant));

        let admin = Caller {
            user_id: Uuid::new_v4(),
            email: None,
            role: Role::Admin,
        };
        assert!(policy.can_access_dependant(&admin, &dependant));
    }
}
