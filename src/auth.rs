//! Role parsing and password hashing.
//!
//! Roles arrive as free text at the HTTP boundary and are parsed into the
//! closed [`Role`] set exactly once; everything past the boundary matches on
//! the enum. Passwords are stored as salted Argon2 hashes and verified with
//! the library's constant-time comparison; plaintext is never persisted.

use std::fmt;
use std::str::FromStr;

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// The closed set of application roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Pharmacist,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Pharmacist => "Pharmacist",
            Role::Customer => "Customer",
        }
    }

    /// Staff roles see catalog-wide dashboards; customers see only their own.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Pharmacist)
    }
}

impl FromStr for Role {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "pharmacist" => Ok(Role::Pharmacist),
            "customer" => Ok(Role::Customer),
            other => Err(ServiceError::ValidationError(format!(
                "Invalid role: {other}"
            ))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hashes a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::InternalError(format!("password hashing failed: {e}")))
}

/// Verifies a password against a stored hash. Malformed hashes verify false.
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing_is_case_insensitive() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("Pharmacist".parse::<Role>().unwrap(), Role::Pharmacist);
        assert_eq!("CUSTOMER".parse::<Role>().unwrap(), Role::Customer);
        assert!("manager".parse::<Role>().is_err());
    }

    #[test]
    fn role_round_trips_through_display() {
        for role in [Role::Admin, Role::Pharmacist, Role::Customer] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn password_hash_verifies_and_rejects() {
        let hash = hash_password("s3cret-pass").unwrap();
        assert_ne!(hash, "s3cret-pass");
        assert!(verify_password("s3cret-pass", &hash));
        assert!(!verify_password("wrong-pass", &hash));
        assert!(!verify_password("s3cret-pass", "not-a-phc-string"));
    }
}
