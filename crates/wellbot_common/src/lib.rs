//! WellBot Common - shared types for the feedback daemon and the intake client.
//!
//! Wire contracts for `/api/feedback`, `/diagnose` and the translation
//! endpoint live here so both sides serialize the same shapes.

pub mod body_parts;
pub mod diagnosis;
pub mod error;
pub mod feedback;
pub mod language;

pub use diagnosis::*;
pub use error::{Result, WellbotError};
pub use feedback::*;
pub use language::*;

/// Header carrying the shared secret for feedback routes
pub const API_KEY_HEADER: &str = "x-api-key";

/// Local storage key mirroring the last diagnosis
pub const DIAGNOSIS_STORAGE_KEY: &str = "diagnosis";

/// Mask a secret for logs: first 8 characters, or `***` when shorter.
pub fn mask_secret(secret: &str) -> String {
    if secret.chars().count() <= 8 {
        "***".to_string()
    } else {
        let prefix: String = secret.chars().take(8).collect();
        format!("{}...", prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("short"), "***");
        assert_eq!(mask_secret("12345678"), "***");
        assert_eq!(mask_secret("1234567890abcdef"), "12345678...");
    }
}
