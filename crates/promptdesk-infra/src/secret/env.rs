//! Environment variable credential source.
//!
//! Looks the credential name up directly as an environment variable
//! (e.g., "GEMINI_API_KEY").

use promptdesk_core::credential::CredentialSource;
use promptdesk_types::error::CredentialError;

/// Read-only credential source backed by the process environment.
///
/// Blank values count as absent.
pub struct EnvCredentialSource;

impl EnvCredentialSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EnvCredentialSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialSource for EnvCredentialSource {
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
        match std::env::var(key) {
            Ok(val) if val.trim().is_empty() => Ok(None),
            Ok(val) => Ok(Some(val)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(std::env::VarError::NotUnicode(_)) => {
                Err(CredentialError::NotUnicode(key.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_source_get_existing() {
        // SAFETY: unique variable name, removed at the end of the test.
        unsafe { std::env::set_var("PROMPTDESK_TEST_CREDENTIAL_1", "test-value-123") };

        let source = EnvCredentialSource::new();
        let result = source.get("PROMPTDESK_TEST_CREDENTIAL_1").unwrap();
        assert_eq!(result, Some("test-value-123".to_string()));

        // SAFETY: the var was just set above.
        unsafe { std::env::remove_var("PROMPTDESK_TEST_CREDENTIAL_1") };
    }

    #[test]
    fn test_env_source_get_missing() {
        let source = EnvCredentialSource::new();
        let result = source.get("PROMPTDESK_NONEXISTENT_CREDENTIAL_XYZ").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_env_source_blank_is_absent() {
        // SAFETY: unique variable name, removed at the end of the test.
        unsafe { std::env::set_var("PROMPTDESK_TEST_CREDENTIAL_BLANK", "   ") };

        let source = EnvCredentialSource::new();
        assert!(source.get("PROMPTDESK_TEST_CREDENTIAL_BLANK").unwrap().is_none());

        // SAFETY: the var was just set above.
        unsafe { std::env::remove_var("PROMPTDESK_TEST_CREDENTIAL_BLANK") };
    }

    #[cfg(unix)]
    #[test]
    fn test_env_source_non_unicode_is_error() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        // SAFETY: unique variable name, removed at the end of the test.
        unsafe {
            std::env::set_var(
                "PROMPTDESK_TEST_CREDENTIAL_BYTES",
                OsStr::from_bytes(&[0x66, 0x6f, 0x80]),
            )
        };

        let source = EnvCredentialSource::new();
        let err = source.get("PROMPTDESK_TEST_CREDENTIAL_BYTES").unwrap_err();
        assert!(matches!(err, CredentialError::NotUnicode(ref k) if k == "PROMPTDESK_TEST_CREDENTIAL_BYTES"));

        // SAFETY: the var was just set above.
        unsafe { std::env::remove_var("PROMPTDESK_TEST_CREDENTIAL_BYTES") };
    }
}
