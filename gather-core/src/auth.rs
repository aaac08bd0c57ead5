//! Sign-up and login flows.
//!
//! Sign-up is two separate writes: the auth identity, then the profile
//! document. They are not atomic, so a failed profile write leaves an identity
//! with no profile. Login then reports that account as "user not found".

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use thiserror::Error;

use crate::backend::{Backend, to_fields};
use crate::error::{AuthError, GatherError, GatherResult, ValidationError};
use crate::model::{Profile, USERS, User};

pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

/// Everything that can stop a sign-up or login.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Signed in, but no profile document exists for the identity.
    #[error("No user profile found for this account")]
    ProfileMissing,

    #[error(transparent)]
    Backend(#[from] GatherError),
}

impl FlowError {
    /// Provider code for auth failures (`auth/wrong-password`, ...).
    pub fn code(&self) -> Option<&'static str> {
        match self {
            FlowError::Auth(e) => Some(e.code()),
            _ => None,
        }
    }
}

/// Shape check applied before any sign-up request.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl SignUpForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() || self.email.is_empty() || self.password.is_empty() {
            return Err(ValidationError::MissingFields);
        }
        if !is_valid_email(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::WeakPassword {
                min: MIN_PASSWORD_LEN,
            });
        }
        Ok(())
    }
}

/// Validate, create the identity, then write its profile.
pub async fn sign_up(backend: &Backend, form: &SignUpForm) -> Result<User, FlowError> {
    form.validate()?;

    let identity = backend.auth.sign_up(&form.email, &form.password).await?;

    let profile = Profile {
        name: form.name.clone(),
        email: form.email.clone(),
        created_at: Utc::now(),
    };
    let written = match to_fields(&profile) {
        Ok(fields) => backend.store.set(USERS, &identity.uid, fields).await,
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        tracing::warn!(uid = %identity.uid, error = %e, "auth identity created without a profile document");
        return Err(e.into());
    }

    tracing::debug!(uid = %identity.uid, "signed up");
    Ok(User::new(identity, &profile))
}

/// Authenticate, then load the profile document.
pub async fn log_in(backend: &Backend, email: &str, password: &str) -> Result<User, FlowError> {
    let identity = backend.auth.sign_in(email, password).await?;

    let Some(doc) = backend.store.get(USERS, &identity.uid).await? else {
        tracing::warn!(uid = %identity.uid, "signed in but no profile document exists");
        return Err(FlowError::ProfileMissing);
    };
    let profile: Profile = doc.decode()?;

    tracing::debug!(uid = %identity.uid, "logged in");
    Ok(User::new(identity, &profile))
}

pub async fn log_out(backend: &Backend) -> GatherResult<()> {
    backend.auth.sign_out().await
}
