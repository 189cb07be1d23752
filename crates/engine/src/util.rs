//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Datelike, Utc};

use crate::{EngineError, ResultEngine};

/// Convert unix seconds from storage into a UTC instant.
pub(crate) fn from_unix(secs: i64, label: &str) -> ResultEngine<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| EngineError::InvalidInput(format!("invalid {label} timestamp: {secs}")))
}

pub(crate) fn now_unix() -> i64 {
    Utc::now().timestamp()
}

/// Trim a free-text value and check its length in characters.
pub(crate) fn normalize_text(value: &str, label: &str, min: usize, max: usize) -> ResultEngine<String> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len < min || len > max {
        return Err(EngineError::InvalidInput(format!(
            "{label} must be between {min} and {max} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Hash a password into an Argon2 PHC string with a random salt.
pub(crate) fn hash_password(password: &str) -> ResultEngine<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| EngineError::Internal(format!("failed to hash password: {err}")))
}

/// Check `password` against a stored PHC string.
pub(crate) fn verify_password(password: &str, hash: &str) -> ResultEngine<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|err| EngineError::Internal(format!("invalid password hash: {err}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Lower-case and trim, the canonical form of tag names.
pub(crate) fn normalize_lower_trim(value: &str) -> String {
    value.trim().to_lowercase()
}

pub(crate) fn validate_amount(amount: i64) -> ResultEngine<()> {
    if amount <= 0 {
        return Err(EngineError::InvalidInput("amount must be > 0".to_string()));
    }
    Ok(())
}

/// `"Food and drinks"` -> `"foodAndDrinks"`.
pub(crate) fn to_lower_camel(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for (i, word) in value
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .enumerate()
    {
        let mut chars = word.chars();
        let Some(first) = chars.next() else {
            continue;
        };
        if i == 0 {
            out.extend(first.to_lowercase());
        } else {
            out.extend(first.to_uppercase());
        }
        out.extend(chars.flat_map(char::to_lowercase));
    }
    out
}

/// Whole months elapsed between two instants.
///
/// A partial month does not count: from the 31st to the 30th of the next
/// month is 0 months. When `to` is before `from` the result is 0.
pub(crate) fn months_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    if to < from {
        return 0;
    }

    let mut months = i64::from(to.year() - from.year()) * 12 + i64::from(to.month())
        - i64::from(from.month());
    if to.day() < from.day() {
        months -= 1;
    }
    months.max(0)
}
