//! Registration payload validation and password hashing.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use gemcart_core::{DomainError, DomainResult};

/// bcrypt work factor for stored passwords.
pub const PASSWORD_HASH_COST: u32 = 12;

const MIN_PASSWORD_CHARS: usize = 6;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Raw registration request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Registration {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// A registration that passed every field check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Error)]
#[error("failed to hash password: {0}")]
pub struct PasswordHashError(#[from] bcrypt::BcryptError);

impl Registration {
    pub fn validate(self) -> DomainResult<ValidRegistration> {
        let (Some(name), Some(email), Some(password)) = (
            self.name.filter(|s| !s.trim().is_empty()),
            self.email.filter(|s| !s.trim().is_empty()),
            self.password.filter(|s| !s.is_empty()),
        ) else {
            return Err(DomainError::validation("Missing required fields"));
        };

        if !EMAIL.is_match(&email) {
            return Err(DomainError::validation("Invalid email format"));
        }
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(DomainError::validation(
                "Password must be at least 6 characters long",
            ));
        }

        Ok(ValidRegistration {
            name,
            email,
            password,
        })
    }
}

/// bcrypt hash; production uses [`PASSWORD_HASH_COST`]. CPU-bound, so run it
/// off the async executor.
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, PasswordHashError> {
    Ok(bcrypt::hash(password, cost)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reg(name: &str, email: &str, password: &str) -> Registration {
        Registration {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[test]
    fn accepts_a_well_formed_registration() {
        let v = reg("Nadia", "nadia@example.com", "secret1").validate().unwrap();
        assert_eq!(v.email, "nadia@example.com");
    }

    #[test]
    fn rejects_missing_fields() {
        let err = Registration {
            name: Some("Nadia".to_string()),
            ..Registration::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, DomainError::validation("Missing required fields"));
    }

    #[test]
    fn rejects_malformed_email() {
        for email in ["nadia", "nadia@example", "na dia@example.com", "@example.com"] {
            let err = reg("Nadia", email, "secret1").validate().unwrap_err();
            assert_eq!(err, DomainError::validation("Invalid email format"), "{email}");
        }
    }

    #[test]
    fn rejects_short_password() {
        let err = reg("Nadia", "nadia@example.com", "12345").validate().unwrap_err();
        assert_eq!(
            err,
            DomainError::validation("Password must be at least 6 characters long")
        );
    }

    #[test]
    fn hashed_password_verifies_and_hides_the_plaintext() {
        let hash = hash_password_with_cost("secret1", 4).unwrap();
        assert_ne!(hash, "secret1");
        assert!(bcrypt::verify("secret1", &hash).unwrap());
        assert!(!bcrypt::verify("secret2", &hash).unwrap());
    }
}
