pub mod seed;
pub mod token;

use std::str::FromStr;

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};

use crate::errors::{AppError, AppResult};

// ── Password helpers ──────────────────────────────────────────
//
// Argon2 is CPU-bound; both helpers run on the blocking pool.

pub async fn hash_password(password: &str) -> AppResult<String> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Hashing failed: {e}")))
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Hashing task failed: {e}")))?
}

pub async fn verify_password(password: &str, hash: &str) -> AppResult<()> {
    let password = password.to_owned();
    let hash     = hash.to_owned();
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&hash)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid hash: {e}")))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| AppError::InvalidCredentials)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Verify task failed: {e}")))?
}

// ── Password policies ─────────────────────────────────────────

/// Password strength rules. Two policies exist and neither is implied; the
/// deployment picks one through `PASSWORD_POLICY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordPolicy {
    /// At least 7 characters with at least one ASCII letter.
    Basic,
    /// At least 8 ASCII alphanumerics with an uppercase, a lowercase and a digit.
    Strict,
}

impl PasswordPolicy {
    pub fn is_acceptable(self, password: &str) -> bool {
        match self {
            PasswordPolicy::Basic => {
                password.len() >= 7 && password.chars().any(|c| c.is_ascii_alphabetic())
            }
            PasswordPolicy::Strict => {
                password.len() >= 8
                    && password.chars().all(|c| c.is_ascii_alphanumeric())
                    && password.chars().any(|c| c.is_ascii_lowercase())
                    && password.chars().any(|c| c.is_ascii_uppercase())
                    && password.chars().any(|c| c.is_ascii_digit())
            }
        }
    }

    pub fn requirement(self) -> &'static str {
        match self {
            PasswordPolicy::Basic => {
                "Password must be at least 7 characters and contain at least one letter"
            }
            PasswordPolicy::Strict => {
                "Password must be at least 8 letters or digits and contain an uppercase letter, a lowercase letter and a number"
            }
        }
    }

    pub fn validate(self, password: &str) -> AppResult<()> {
        if self.is_acceptable(password) {
            Ok(())
        } else {
            Err(AppError::BadRequest(self.requirement().into()))
        }
    }
}

impl FromStr for PasswordPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic"  => Ok(PasswordPolicy::Basic),
            "strict" => Ok(PasswordPolicy::Strict),
            other    => Err(format!("unknown password policy: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_policy_needs_seven_chars_and_a_letter() {
        assert!(PasswordPolicy::Basic.is_acceptable("abcdefg"));
        assert!(PasswordPolicy::Basic.is_acceptable("123456a"));
        assert!(!PasswordPolicy::Basic.is_acceptable("abcdef"));
        assert!(!PasswordPolicy::Basic.is_acceptable("1234567"));
    }

    #[test]
    fn strict_policy_needs_mixed_case_and_digit() {
        assert!(PasswordPolicy::Strict.is_acceptable("Abcdefg1"));
        assert!(!PasswordPolicy::Strict.is_acceptable("abcdefg1"));
        assert!(!PasswordPolicy::Strict.is_acceptable("ABCDEFG1"));
        assert!(!PasswordPolicy::Strict.is_acceptable("Abcdefgh"));
        assert!(!PasswordPolicy::Strict.is_acceptable("Abcde1"));
        assert!(!PasswordPolicy::Strict.is_acceptable("Abcdef1!"));
    }

    #[test]
    fn policy_parses_from_config_value() {
        assert_eq!("basic".parse::<PasswordPolicy>(), Ok(PasswordPolicy::Basic));
        assert_eq!(" STRICT ".parse::<PasswordPolicy>(), Ok(PasswordPolicy::Strict));
        assert!("weak".parse::<PasswordPolicy>().is_err());
    }

    #[tokio::test]
    async fn hash_then_verify() {
        let hash = hash_password("abcdefg").await.unwrap();
        assert_ne!(hash, "abcdefg");
        assert!(verify_password("abcdefg", &hash).await.is_ok());
        assert!(matches!(
            verify_password("wrong-pw", &hash).await,
            Err(AppError::InvalidCredentials)
        ));
    }
}
