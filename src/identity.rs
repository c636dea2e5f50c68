//! Identity provider seam.
//!
//! Sign-up/sign-in failures carry the provider's message verbatim; callers
//! show it as-is.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::info;

/// The signed-in account as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub uid: String,
    pub display_name: Option<String>,
    pub email: String,
    pub photo_url: Option<String>,
}

impl Identity {
    /// Name to greet the learner with: the display name, else the part of
    /// the email before `@`.
    pub fn preferred_name(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => self.email.split('@').next().unwrap_or(&self.email),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AuthError {
    pub message: String,
}

impl AuthError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub trait IdentityProvider: Send + Sync {
    fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<Identity, AuthError>;

    fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    fn sign_out(&self) -> Result<(), AuthError>;
}

/// Minimum password length accepted by [`LocalIdentityProvider`].
pub const MIN_PASSWORD_LEN: usize = 6;

/// Constant-time string comparison
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

struct Account {
    identity: Identity,
    password: String,
}

/// In-process identity provider for local development and tests.
#[derive(Default)]
pub struct LocalIdentityProvider {
    accounts: Mutex<HashMap<String, Account>>,
}

impl LocalIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Account id for a normalized email. Stable across processes, so snapshots
/// saved by an earlier run stay with the same learner.
fn local_uid(email: &str) -> String {
    let digest = hex::encode(Sha256::digest(email.as_bytes()));
    format!("local-{}", &digest[..20])
}

impl IdentityProvider for LocalIdentityProvider {
    fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<Identity, AuthError> {
        let email = normalize_email(email);
        if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            return Err(AuthError::new("The email address is badly formatted."));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::new(format!(
                "Password should be at least {} characters.",
                MIN_PASSWORD_LEN
            )));
        }

        let mut accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
        if accounts.contains_key(&email) {
            return Err(AuthError::new(
                "The email address is already in use by another account.",
            ));
        }

        let identity = Identity {
            uid: local_uid(&email),
            display_name: display_name.map(str::to_string),
            email: email.clone(),
            photo_url: None,
        };
        accounts.insert(
            email,
            Account {
                identity: identity.clone(),
                password: password.to_string(),
            },
        );
        info!("Registered account {}", identity.uid);
        Ok(identity)
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
        match accounts.get(&normalize_email(email)) {
            Some(account) if constant_time_compare(&account.password, password) => {
                Ok(account.identity.clone())
            }
            _ => Err(AuthError::new("Invalid email or password.")),
        }
    }

    fn sign_out(&self) -> Result<(), AuthError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("secret123", "secret123"));
        assert!(!constant_time_compare("secret123", "secret124"));
        assert!(!constant_time_compare("secret123", "secret12"));
        assert!(!constant_time_compare("", "secret"));
    }

    // ==================== Identity Tests ====================

    #[test]
    fn test_preferred_name_uses_display_name() {
        let identity = Identity {
            uid: "u".into(),
            display_name: Some("Ada".into()),
            email: "ada@example.com".into(),
            photo_url: None,
        };
        assert_eq!(identity.preferred_name(), "Ada");
    }

    #[test]
    fn test_preferred_name_falls_back_to_email() {
        let identity = Identity {
            uid: "u".into(),
            display_name: Some("  ".into()),
            email: "grace@example.com".into(),
            photo_url: None,
        };
        assert_eq!(identity.preferred_name(), "grace");
    }

    #[test]
    fn test_auth_error_displays_message_verbatim() {
        assert_eq!(AuthError::new("Nope.").to_string(), "Nope.");
    }

    // ==================== Sign-up Tests ====================

    #[test]
    fn test_sign_up_then_sign_in() {
        let provider = LocalIdentityProvider::new();
        let created = provider
            .sign_up("Ada@Example.com", "hunter22", Some("Ada"))
            .unwrap();

        assert_eq!(created.email, "ada@example.com");
        let signed_in = provider.sign_in("ada@example.com", "hunter22").unwrap();
        assert_eq!(signed_in, created);
    }

    #[test]
    fn test_sign_up_assigns_distinct_uids() {
        let provider = LocalIdentityProvider::new();
        let a = provider.sign_up("a@x.io", "password", None).unwrap();
        let b = provider.sign_up("b@x.io", "password", None).unwrap();
        assert_ne!(a.uid, b.uid);
    }

    #[test]
    fn test_uid_is_stable_across_providers() {
        let first = LocalIdentityProvider::new()
            .sign_up("ada@example.com", "password", None)
            .unwrap();
        let second = LocalIdentityProvider::new()
            .sign_up(" ADA@example.com", "password", None)
            .unwrap();
        let other = LocalIdentityProvider::new()
            .sign_up("bob@example.com", "password", None)
            .unwrap();

        assert_eq!(first.uid, second.uid);
        assert_ne!(first.uid, other.uid);
        assert!(first.uid.starts_with("local-"));
    }

    #[test]
    fn test_sign_up_rejects_short_password() {
        let provider = LocalIdentityProvider::new();
        let err = provider.sign_up("a@x.io", "12345", None).unwrap_err();
        assert!(err.message.contains("at least 6"));
    }

    #[test]
    fn test_sign_up_rejects_bad_email() {
        let provider = LocalIdentityProvider::new();
        assert!(provider.sign_up("not-an-email", "password", None).is_err());
        assert!(provider.sign_up("@x.io", "password", None).is_err());
    }

    #[test]
    fn test_sign_up_rejects_duplicate_email() {
        let provider = LocalIdentityProvider::new();
        provider.sign_up("a@x.io", "password", None).unwrap();
        let err = provider.sign_up("A@X.IO", "password2", None).unwrap_err();
        assert!(err.message.contains("already in use"));
    }

    // ==================== Sign-in Tests ====================

    #[test]
    fn test_sign_in_wrong_password() {
        let provider = LocalIdentityProvider::new();
        provider.sign_up("a@x.io", "password", None).unwrap();
        let err = provider.sign_in("a@x.io", "passw0rd").unwrap_err();
        assert_eq!(err.message, "Invalid email or password.");
    }

    #[test]
    fn test_sign_in_unknown_account() {
        let provider = LocalIdentityProvider::new();
        assert!(provider.sign_in("ghost@x.io", "password").is_err());
    }

    #[test]
    fn test_sign_out_succeeds() {
        assert!(LocalIdentityProvider::new().sign_out().is_ok());
    }
}
