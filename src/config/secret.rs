//! Secret configuration values
//!
//! The store connection string and the endpoint bearer token are held in
//! [`SecretString`]: zeroized on drop, redacted in `Debug` output, and only
//! readable through `expose_secret()`.
//!
//! # Example
//!
//! ```rust
//! use rxsync::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let dsn = secret_string("postgresql://rx:pw@db/pharmacy".to_string());
//! assert!(dsn.expose_secret().starts_with("postgresql://"));
//! assert!(!format!("{dsn:?}").contains("pw@db"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// String newtype that can live inside a [`Secret`]
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    /// Check if the secret value is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check if the secret value starts with a prefix
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    /// Parse the secret value into another type
    pub fn parse<F: std::str::FromStr>(&self) -> Result<F, F::Err> {
        self.0.parse()
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// Zeroizing, redacted string
pub type SecretString = Secret<SecretValue>;

/// Wraps a plain string as a [`SecretString`]
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

/// Wraps an optional plain string as an optional [`SecretString`]
///
/// ```rust
/// use rxsync::config::secret_string_opt;
///
/// assert!(secret_string_opt(Some("token".to_string())).is_some());
/// assert!(secret_string_opt(None).is_none());
/// ```
#[inline]
pub fn secret_string_opt(value: Option<String>) -> Option<SecretString> {
    value.map(secret_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_debug_redacted() {
        let secret = secret_string("postgresql://rx:hunter2@db/pharmacy".to_string());
        let debug_output = format!("{secret:?}");

        assert!(!debug_output.contains("hunter2"));
        assert!(debug_output.contains("REDACTED") || debug_output.contains("Secret"));
    }

    #[test]
    fn test_secret_parse() {
        let secret = secret_string("postgresql://rx:pw@localhost:5432/pharmacy".to_string());
        let parsed: tokio_postgres::Config = secret.expose_secret().parse().unwrap();
        assert_eq!(parsed.get_dbname(), Some("pharmacy"));
    }

    #[test]
    fn test_secret_serde() {
        use serde::{Deserialize, Serialize};

        #[derive(Serialize, Deserialize)]
        struct Destination {
            auth_token: SecretString,
        }

        let config = Destination {
            auth_token: secret_string("abc123".to_string()),
        };

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("abc123"));

        let deserialized: Destination = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.auth_token.expose_secret(), "abc123");
    }
}
