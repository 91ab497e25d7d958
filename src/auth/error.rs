use thiserror::Error;

/// Why a request failed authentication.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("OIDC provider is required")]
    ProviderMissing,

    #[error("Authorization header is required")]
    MissingHeader,

    #[error("Invalid authorization format")]
    InvalidFormat,

    #[error("Error verifying token: {0}")]
    Verification(String),

    #[error("Error mapping token: {0}")]
    Mapping(String),

    /// Provider metadata or key set could not be fetched.
    #[error("OIDC discovery failed: {0}")]
    Discovery(String),
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::Verification(err.to_string())
    }
}
