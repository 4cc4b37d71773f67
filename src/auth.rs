//! Credentials, opaque tokens and the session authorization policy.

use crate::error::{AppError, AppResult};
use crate::models::{GameSession, User};
use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "pokernight_session";

/// Lifetime of a password reset token, in minutes
pub const RESET_TOKEN_TTL_MINUTES: i64 = 60;

const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 128;

/// Hash a password into an argon2 PHC string with a fresh salt
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Check a password against a stored PHC string
pub fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(stored_hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Generate a random 256-bit token, hex encoded. Handed to the client once.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hash a token for storage; lookups hash the presented token the same way
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn validate_password(password: &str) -> AppResult<()> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at most {} characters",
            MAX_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Trim and lower-case an email, rejecting obviously malformed input
pub fn normalize_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }
    Ok(email)
}

/// Host and site admins manage everything within a session
pub fn can_manage_session(actor: &User, session: &GameSession) -> bool {
    actor.is_admin() || actor.id == session.host_id
}

/// Managers, or the player acting on their own seat
pub fn can_act_for_player(actor: &User, session: &GameSession, player_user_id: Uuid) -> bool {
    can_manage_session(actor, session) || actor.id == player_user_id
}

/// Managers and anyone seated in the session may look at it
pub fn can_view_session(actor: &User, session: &GameSession, is_participant: bool) -> bool {
    can_manage_session(actor, session) || is_participant
}

pub fn require_session_manager(actor: &User, session: &GameSession) -> AppResult<()> {
    if can_manage_session(actor, session) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only the host or an admin can do this".to_string(),
        ))
    }
}

pub fn require_admin(actor: &User) -> AppResult<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Admin access required".to_string()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{SessionStatus, UserRole};
    use rust_decimal::Decimal;

    pub(crate) fn user_with_role(role: UserRole) -> User {
        let now = chrono::Utc::now().naive_utc();
        User {
            id: Uuid::new_v4(),
            name: "Test Player".to_string(),
            email: "player@example.com".to_string(),
            password_hash: String::new(),
            role: role.as_str().to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn session_hosted_by(host_id: Uuid) -> GameSession {
        let now = chrono::Utc::now().naive_utc();
        GameSession {
            id: Uuid::new_v4(),
            name: "Friday Game".to_string(),
            host_id,
            buy_in: Decimal::new(2000, 2),
            location: None,
            notes: None,
            status: SessionStatus::Ongoing.as_str().to_string(),
            started_at: now,
            ended_at: None,
            created_at: now,
        }
    }

    #[test]
    fn test_password_round_trip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse battery", &hash).unwrap());
        assert!(!verify_password("wrong password", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_rejects_garbage_hash() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_tokens_are_unique_and_hashed() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);

        let hashed = hash_token(&a);
        assert_eq!(hashed.len(), 64);
        assert_ne!(hashed, a);
        assert_eq!(hashed, hash_token(&a));
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long enough").is_ok());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email("  Alice@Example.COM ").unwrap(),
            "alice@example.com"
        );
        assert!(normalize_email("no-at-sign").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("alice@localhost").is_err());
        assert!(normalize_email("al ice@example.com").is_err());
    }

    #[test]
    fn test_session_policy() {
        let host = user_with_role(UserRole::User);
        let admin = user_with_role(UserRole::Admin);
        let player = user_with_role(UserRole::User);
        let stranger = user_with_role(UserRole::User);
        let session = session_hosted_by(host.id);

        assert!(can_manage_session(&host, &session));
        assert!(can_manage_session(&admin, &session));
        assert!(!can_manage_session(&player, &session));

        assert!(can_act_for_player(&player, &session, player.id));
        assert!(can_act_for_player(&host, &session, player.id));
        assert!(!can_act_for_player(&stranger, &session, player.id));

        assert!(can_view_session(&player, &session, true));
        assert!(!can_view_session(&stranger, &session, false));
        assert!(can_view_session(&admin, &session, false));

        assert!(require_session_manager(&stranger, &session).is_err());
        assert!(require_admin(&admin).is_ok());
        assert!(matches!(require_admin(&host), Err(AppError::Forbidden(_))));
    }
}
