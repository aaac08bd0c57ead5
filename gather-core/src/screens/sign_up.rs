use super::Alert;
use super::login::failure_message;
use crate::auth::{self, FlowError, SignUpForm};
use crate::backend::Backend;
use crate::error::{AuthError, ValidationError};
use crate::model::User;

#[derive(Debug, Clone, Default)]
pub struct SignUpScreen {
    pub form: SignUpForm,
}

impl SignUpScreen {
    pub const TITLE: &'static str = "Sign Up";
    pub const SUBMIT_LABEL: &'static str = "Sign Up";
    pub const PENDING_LABEL: &'static str = "Signing Up...";
    pub const SWITCH_LABEL: &'static str = "Already have an account? Login";

    pub fn new() -> Self {
        Self::default()
    }

    pub async fn submit(&self, backend: &Backend) -> Result<User, Alert> {
        auth::sign_up(backend, &self.form).await.map_err(|e| {
            if !matches!(e, FlowError::Validation(_)) {
                tracing::error!(code = ?e.code(), error = %e, "Sign up error");
            }
            Self::alert_for(&e)
        })
    }

    pub fn alert_for(err: &FlowError) -> Alert {
        match err {
            FlowError::Validation(v) => {
                let title = match v {
                    ValidationError::MissingFields => "Validation Error",
                    ValidationError::InvalidEmail => "Invalid Email",
                    ValidationError::WeakPassword { .. } => "Weak Password",
                };
                Alert::new(title, &v.to_string())
            }
            FlowError::Auth(AuthError::EmailInUse) => Alert::new(
                "Sign Up Failed",
                "This email address is already in use. Please use a different email.",
            ),
            FlowError::Auth(AuthError::InvalidEmail) => Alert::new(
                "Sign Up Failed",
                "The email address is not valid. Please enter a valid email address.",
            ),
            FlowError::Auth(AuthError::WeakPassword) => Alert::new(
                "Sign Up Failed",
                "The password is too weak. Please use a stronger password.",
            ),
            other => Alert::new("Sign Up Failed", &failure_message(other)),
        }
    }
}
