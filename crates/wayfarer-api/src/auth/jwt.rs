//! HS256 JWT verification (and issuance, used by tests and tooling).

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;
use wayfarer_core::models::{Caller, Role};
use wayfarer_core::AppError;

use super::models::JwtClaims;

/// Verify a bearer token and produce the caller identity.
pub fn verify_token(token: &str, secret: &str) -> Result<Caller, AppError> {
    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| AppError::Unauthenticated(format!("Invalid token: {}", e)))?;

    let role = match data.claims.role.as_str() {
        "admin" => Role::Admin,
        "customer" => Role::Customer,
        other => {
            return Err(AppError::Unauthenticated(format!(
                "Unknown role claim: {}",
                other
            )));
        }
    };

    Ok(Caller {
        user_id: data.claims.sub,
        email: data.claims.email,
        role,
    })
}

/// Issue a token for the given identity. The identity service is the normal
/// issuer; this is used by tests and local tooling.
#[allow(dead_code)]
pub fn issue_token(
    user_id: Uuid,
    email: Option<String>,
    role: Role,
    secret: &str,
    expiry_hours: i64,
) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: user_id,
        email,
        role: role.to_string(),
        exp: (now + Duration::hours(expiry_hours)).timestamp(),
        iat: now.timestamp(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to issue token: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-chars-long";

    #[test]
    fn round_trip_preserves_identity() {
        let user_id = Uuid::new_v4();
        let token = issue_token(
            user_id,
            Some("ada@example.com".to_string()),
            Role::Customer,
            SECRET,
            24,
        )
        .unwrap();

        let caller = verify_token(&token, SECRET).unwrap();
        assert_eq!(caller.user_id, user_id);
        assert_eq!(caller.email.as_deref(), Some("ada@example.com"));
        assert_eq!(caller.role, Role::Customer);
    }

    #[test]
    fn missing_email_claim_is_allowed() {
        let token = issue_token(Uuid::new_v4(), None, Role::Admin, SECRET, 24).unwrap();
        let caller = verify_token(&token, SECRET).unwrap();
        assert!(caller.email.is_none());
        assert_eq!(caller.role, Role::Admin);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token(Uuid::new_v4(), None, Role::Customer, SECRET, 24).unwrap();
        let err = verify_token(&token, "another-secret-key-32-characters!!").unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue_token(Uuid::new_v4(), None, Role::Customer, SECRET, -1).unwrap();
        let err = verify_token(&token, SECRET).unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(_)));
    }
}
