//! Credential handling for model providers.
//!
//! - **No accidental logging**: credentials cannot appear in Debug/Display output
//! - **Memory safety**: credentials are zeroed on drop
//! - **Never crash on absence**: a missing key becomes a placeholder whose
//!   absence is reported when a prediction is attempted
//!
//! ## Usage
//!
//! ```ignore
//! use crate::providers::secrets::ApiCredential;
//!
//! // Config value first, then environment, then placeholder
//! let cred = ApiCredential::from_config_env_or_placeholder(
//!     &config, "api_key", "GEMINI_API_KEY", "Gemini API key",
//! );
//!
//! if cred.is_configured() {
//!     request.header("x-goog-api-key", cred.expose());
//! }
//! ```

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value as JsonValue;
use std::fmt;

use super::ProviderError;

/// Value substituted when no credential is configured.
pub const MISSING_CREDENTIAL_PLACEHOLDER: &str = "MISSING_API_KEY";

/// Where a credential was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Loaded from configuration file/JSON
    Config,
    /// Loaded from environment variable
    Environment,
    /// Provided programmatically
    Programmatic,
    /// Nothing was configured; placeholder sentinel in use
    Placeholder,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Config => write!(f, "config"),
            CredentialSource::Environment => write!(f, "environment"),
            CredentialSource::Programmatic => write!(f, "programmatic"),
            CredentialSource::Placeholder => write!(f, "placeholder"),
        }
    }
}

/// A securely-stored API credential.
///
/// Shows `[REDACTED]` in Debug and Display output and must be exposed
/// explicitly with [`expose`](Self::expose) at the point of use.
pub struct ApiCredential {
    value: SecretString,
    source: CredentialSource,
    name: &'static str,
}

impl ApiCredential {
    /// Create a new credential from a string value.
    pub fn new(value: impl Into<String>, source: CredentialSource, name: &'static str) -> Self {
        Self {
            value: SecretString::from(value.into()),
            source,
            name,
        }
    }

    /// The placeholder used when nothing is configured.
    pub fn placeholder(name: &'static str) -> Self {
        Self::new(
            MISSING_CREDENTIAL_PLACEHOLDER,
            CredentialSource::Placeholder,
            name,
        )
    }

    /// Load credential from an environment variable.
    ///
    /// Empty values count as unset.
    pub fn from_env(env_var: &str, name: &'static str) -> Result<Self, ProviderError> {
        match std::env::var(env_var) {
            Ok(v) if !v.trim().is_empty() => Ok(Self::new(v, CredentialSource::Environment, name)),
            _ => Err(ProviderError::NotConfigured(format!(
                "{} not set: configure '{}' environment variable",
                name, env_var
            ))),
        }
    }

    /// Load credential from JSON config, falling back to environment variable.
    pub fn from_config_or_env(
        config: &JsonValue,
        config_key: &str,
        env_var: &str,
        name: &'static str,
    ) -> Result<Self, ProviderError> {
        // Try config first
        if let Some(value) = config[config_key].as_str().filter(|v| !v.trim().is_empty()) {
            return Ok(Self::new(value, CredentialSource::Config, name));
        }

        // Fall back to environment
        if let Ok(cred) = Self::from_env(env_var, name) {
            return Ok(cred);
        }

        Err(ProviderError::NotConfigured(format!(
            "{} required: set '{}' in config or {} environment variable",
            name, config_key, env_var
        )))
    }

    /// Like [`from_config_or_env`](Self::from_config_or_env), but substitutes
    /// the placeholder instead of failing.
    ///
    /// Provider construction never fails on a missing key; the predictor
    /// reports it before any network call.
    pub fn from_config_env_or_placeholder(
        config: &JsonValue,
        config_key: &str,
        env_var: &str,
        name: &'static str,
    ) -> Self {
        Self::from_config_or_env(config, config_key, env_var, name).unwrap_or_else(|_| {
            tracing::warn!(
                env_var = %env_var,
                "{} is not set; predictions will fail until it is configured",
                name
            );
            Self::placeholder(name)
        })
    }

    /// Expose the credential value for use in API calls.
    ///
    /// Only call this where the credential is actually needed (e.g. an HTTP
    /// header). Never store the exposed value.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    /// Check if the credential is empty.
    pub fn is_empty(&self) -> bool {
        self.value.expose_secret().trim().is_empty()
    }

    /// Whether a real credential (not the placeholder) is present.
    pub fn is_configured(&self) -> bool {
        self.source != CredentialSource::Placeholder && !self.is_empty()
    }

    /// Get the source of this credential.
    pub fn source(&self) -> CredentialSource {
        self.source
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("value", &"[REDACTED]")
            .field("source", &self.source)
            .field("name", &self.name)
            .finish()
    }
}

impl fmt::Display for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {} [REDACTED]", self.name, self.source)
    }
}
