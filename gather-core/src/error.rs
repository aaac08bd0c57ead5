//! Error types for gather.

use thiserror::Error;

/// Errors that can occur in gather operations.
#[derive(Error, Debug)]
pub enum GatherError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No user is signed in")]
    NotSignedIn,

    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Result type alias for gather operations.
pub type GatherResult<T> = Result<T, GatherError>;

/// Failures reported by the authentication provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("The email address is badly formatted")]
    InvalidEmail,

    #[error("The password is invalid")]
    WrongPassword,

    #[error("There is no user record for this email")]
    UserNotFound,

    #[error("The email address is already in use by another account")]
    EmailInUse,

    #[error("The password must be 6 characters long or more")]
    WeakPassword,

    #[error("{0}")]
    Unknown(String),
}

impl AuthError {
    /// Stable provider-style code, e.g. `auth/email-already-in-use`.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidEmail => "auth/invalid-email",
            AuthError::WrongPassword => "auth/wrong-password",
            AuthError::UserNotFound => "auth/user-not-found",
            AuthError::EmailInUse => "auth/email-already-in-use",
            AuthError::WeakPassword => "auth/weak-password",
            AuthError::Unknown(_) => "auth/unknown",
        }
    }
}

/// Client-side sign-up validation failures. These never reach the backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill in all fields.")]
    MissingFields,

    #[error("Please enter a valid email address.")]
    InvalidEmail,

    #[error("Password must be at least {min} characters long.")]
    WeakPassword { min: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_codes_are_stable() {
        assert_eq!(AuthError::EmailInUse.code(), "auth/email-already-in-use");
        assert_eq!(AuthError::Unknown("boom".into()).code(), "auth/unknown");
    }

    #[test]
    fn auth_error_converts_into_gather_error() {
        let err: GatherError = AuthError::UserNotFound.into();
        assert!(matches!(err, GatherError::Auth(AuthError::UserNotFound)));
        assert_eq!(err.to_string(), "There is no user record for this email");
    }

    #[test]
    fn weak_password_message_names_minimum() {
        let err = ValidationError::WeakPassword { min: 6 };
        assert_eq!(err.to_string(), "Password must be at least 6 characters long.");
    }
}
