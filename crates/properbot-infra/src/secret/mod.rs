//! API key resolution from the environment.
//!
//! The single secret this system needs is the LLM provider API key, read
//! from the environment at process start and wrapped in `SecretString` so
//! it never appears in Debug output or logs.
//!
//! Resolution order: `PROPERBOT_OPENAI_API_KEY`, then `OPENAI_API_KEY`.

use secrecy::SecretString;
use thiserror::Error;

/// Environment variables checked for the API key, in priority order.
const API_KEY_VARS: [&str; 2] = ["PROPERBOT_OPENAI_API_KEY", "OPENAI_API_KEY"];

/// The API key could not be resolved from the environment.
#[derive(Debug, Error)]
#[error("no API key found; set {} (or {})", API_KEY_VARS[1], API_KEY_VARS[0])]
pub struct MissingApiKey;

/// Resolve the LLM provider API key from the environment.
///
/// Empty values are treated as unset.
pub fn openai_api_key() -> Result<SecretString, MissingApiKey> {
    for var in API_KEY_VARS {
        match std::env::var(var) {
            Ok(value) if !value.trim().is_empty() => {
                return Ok(SecretString::from(value));
            }
            _ => continue,
        }
    }
    Err(MissingApiKey)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_api_key_from_env() {
        // SAFETY: This test runs serially and we clean up after.
        unsafe { std::env::set_var("PROPERBOT_OPENAI_API_KEY", "sk-test-123") };

        let key = openai_api_key().unwrap();
        assert_eq!(key.expose_secret(), "sk-test-123");

        // SAFETY: The var was just set above.
        unsafe { std::env::remove_var("PROPERBOT_OPENAI_API_KEY") };
    }

    #[test]
    fn test_missing_key_names_variable() {
        let err = MissingApiKey;
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}
