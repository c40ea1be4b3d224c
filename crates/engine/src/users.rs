//! User accounts and the fixed admin credential holder.
//!
//! Passwords are never stored: both users and the admin keep an Argon2 PHC
//! hash with a per-credential salt, and login verifies against it.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand_core::OsRng;

use crate::{ResultCafe, cart::Cart, error::CafeError, orders::Order};

pub(crate) const MAX_USERNAME_LEN: usize = 30;

/// A registered customer: credentials, a transient cart and the orders
/// placed so far.
#[derive(Clone, Debug)]
pub struct User {
    pub username: String,
    password_hash: String,
    pub cart: Cart,
    pub order_history: Vec<Order>,
}

impl User {
    pub fn new(username: String, password: &str) -> ResultCafe<Self> {
        Ok(Self::from_hash(username, hash_password(password)?))
    }

    pub(crate) fn from_hash(username: String, password_hash: String) -> Self {
        Self {
            username,
            password_hash,
            cart: Cart::new(),
            order_history: Vec::new(),
        }
    }

    /// At least 6 characters, letters and digits only.
    pub fn validate_password(password: &str) -> bool {
        password.chars().count() >= 6 && password.chars().all(|c| c.is_ascii_alphanumeric())
    }

    pub fn verify_password(&self, password: &str) -> bool {
        verify_password(password, &self.password_hash)
    }

    pub(crate) fn password_hash(&self) -> &str {
        &self.password_hash
    }
}

/// The single administrative credential holder.
#[derive(Clone, Debug)]
pub struct Admin {
    username: String,
    password_hash: String,
}

impl Admin {
    pub fn new(username: &str, password: &str) -> ResultCafe<Self> {
        Ok(Self {
            username: username.to_string(),
            password_hash: hash_password(password)?,
        })
    }

    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        self.username == username && verify_password(password, &self.password_hash)
    }
}

fn hash_password(password: &str) -> ResultCafe<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| CafeError::PasswordHash(err.to_string()))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_rule() {
        assert!(User::validate_password("abc123"));
        assert!(User::validate_password("A1B2C3D4"));
        assert!(!User::validate_password("abc12"));
        assert!(!User::validate_password("abc 123"));
        assert!(!User::validate_password("abc!123"));
    }

    #[test]
    fn verify_round_trip() {
        let user = User::new(String::from("mario"), "secret1").unwrap();

        assert!(user.verify_password("secret1"));
        assert!(!user.verify_password("secret2"));
    }

    #[test]
    fn admin_matches_exact_credentials() {
        let admin = Admin::new("admin", "admin123").unwrap();

        assert!(admin.authenticate("admin", "admin123"));
        assert!(!admin.authenticate("Admin", "admin123"));
        assert!(!admin.authenticate("admin", "admin124"));
    }

    #[test]
    fn corrupt_hash_never_verifies() {
        let user = User::from_hash(String::from("mario"), String::from("not-a-phc-string"));
        assert!(!user.verify_password("secret1"));
    }
}
