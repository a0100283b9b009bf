//! API keys.

use crate::DataType;

/// The collection of keys handed to the client at construction.
///
/// Only the secret keys are sent with requests; the public keys are kept for
/// callers that need to hand them to browser-side code.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Keys {
    /// Publishable production key.
    pub public_key: String,
    /// Secret production key.
    pub secret_key: String,
    /// Publishable sandbox key.
    pub public_sandbox_key: String,
    /// Secret sandbox key.
    pub secret_sandbox_key: String,
}

impl Keys {
    /// Returns the secret key used to sign requests for the given data type.
    #[must_use]
    pub fn token(&self, data_type: DataType) -> &str {
        match data_type {
            DataType::Authentic => &self.secret_key,
            DataType::Sandbox => &self.secret_sandbox_key,
        }
    }
}

// Keys never end up in logs.
impl std::fmt::Debug for Keys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keys").finish_non_exhaustive()
    }
}
