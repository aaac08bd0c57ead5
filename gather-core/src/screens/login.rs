use super::Alert;
use crate::auth::{self, FlowError};
use crate::backend::Backend;
use crate::error::AuthError;
use crate::model::User;

#[derive(Debug, Clone, Default)]
pub struct LoginScreen {
    pub email: String,
    pub password: String,
}

impl LoginScreen {
    pub const TITLE: &'static str = "Login";
    pub const SUBMIT_LABEL: &'static str = "Login";
    pub const PENDING_LABEL: &'static str = "Logging In...";
    pub const SWITCH_LABEL: &'static str = "Don't have an account? Sign Up";

    pub fn new() -> Self {
        Self::default()
    }

    pub async fn submit(&self, backend: &Backend) -> Result<User, Alert> {
        auth::log_in(backend, &self.email, &self.password)
            .await
            .map_err(|e| {
                tracing::error!(code = ?e.code(), error = %e, "Login error");
                Self::alert_for(&e)
            })
    }

    pub fn alert_for(err: &FlowError) -> Alert {
        match err {
            FlowError::ProfileMissing => {
                Alert::new("User Not Found", "No user found in Firestore for this email.")
            }
            FlowError::Auth(AuthError::UserNotFound) => {
                Alert::new("Login Failed", "No user found with this email address.")
            }
            FlowError::Auth(AuthError::WrongPassword) => {
                Alert::new("Login Failed", "Incorrect password. Please try your password.")
            }
            FlowError::Auth(AuthError::InvalidEmail) => Alert::new(
                "Login Failed",
                "Invalid email address format. Please try again.",
            ),
            other => Alert::new("Login Failed", &failure_message(other)),
        }
    }
}

pub(super) fn failure_message(err: &FlowError) -> String {
    let message = err.to_string();
    if message.is_empty() {
        "An unknown error occurred.".to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SignUpForm;

    #[tokio::test]
    async fn login_after_sign_up() {
        let backend = Backend::in_memory();
        auth::sign_up(
            &backend,
            &SignUpForm {
                name: "Alice".into(),
                email: "alice@example.com".into(),
                password: "secret1".into(),
            },
        )
        .await
        .unwrap();
        auth::log_out(&backend).await.unwrap();

        let screen = LoginScreen {
            email: "alice@example.com".into(),
            password: "secret1".into(),
        };
        assert_eq!(screen.submit(&backend).await.unwrap().name, "Alice");
    }

    #[tokio::test]
    async fn unknown_user_alert() {
        let screen = LoginScreen {
            email: "nobody@example.com".into(),
            password: "secret1".into(),
        };
        let alert = screen.submit(&Backend::in_memory()).await.unwrap_err();
        assert_eq!(
            alert,
            Alert::new("Login Failed", "No user found with this email address.")
        );
    }

    #[tokio::test]
    async fn wrong_password_alert() {
        let backend = Backend::in_memory();
        backend
            .auth
            .sign_up("alice@example.com", "secret1")
            .await
            .unwrap();

        let screen = LoginScreen {
            email: "alice@example.com".into(),
            password: "secret2".into(),
        };
        assert_eq!(
            screen.submit(&backend).await.unwrap_err(),
            Alert::new("Login Failed", "Incorrect password. Please try your password.")
        );
    }

    #[tokio::test]
    async fn identity_without_profile_alert() {
        let backend = Backend::in_memory();
        backend
            .auth
            .sign_up("alice@example.com", "secret1")
            .await
            .unwrap();

        let screen = LoginScreen {
            email: "alice@example.com".into(),
            password: "secret1".into(),
        };
        assert_eq!(
            screen.submit(&backend).await.unwrap_err(),
            Alert::new("User Not Found", "No user found in Firestore for this email.")
        );
    }

    #[test]
    fn alert_titles() {
        assert_eq!(
            LoginScreen::alert_for(&FlowError::ProfileMissing).title,
            "User Not Found"
        );
        assert_eq!(
            LoginScreen::alert_for(&FlowError::Auth(AuthError::Unknown("quota".into()))).message,
            "quota"
        );
        assert_eq!(
            LoginScreen::alert_for(&FlowError::Auth(AuthError::Unknown(String::new()))).message,
            "An unknown error occurred."
        );
    }
}
