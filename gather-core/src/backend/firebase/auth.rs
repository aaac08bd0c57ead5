//! Firebase Authentication over the Identity Toolkit REST API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::backend::AuthProvider;
use crate::error::{AuthError, GatherError, GatherResult};
use crate::model::Identity;

const IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const TOKEN_URL: &str = "https://securetoken.googleapis.com/v1/token";

/// Refresh the ID token this long before it actually expires.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    email: String,
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Clone)]
struct AuthSession {
    identity: Identity,
    id_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

fn expires_at(expires_in: &str) -> DateTime<Utc> {
    let secs = expires_in.parse::<i64>().unwrap_or(3600);
    Utc::now() + chrono::Duration::seconds(secs)
}

/// Map an Identity Toolkit error message onto the auth taxonomy.
///
/// Messages look like `EMAIL_EXISTS` or `WEAK_PASSWORD : Password should be ...`.
pub fn map_error_message(message: &str) -> AuthError {
    let code = message
        .split([' ', ':'])
        .next()
        .unwrap_or_default();
    match code {
        "EMAIL_EXISTS" => AuthError::EmailInUse,
        "INVALID_EMAIL" | "MISSING_EMAIL" => AuthError::InvalidEmail,
        "WEAK_PASSWORD" => AuthError::WeakPassword,
        "EMAIL_NOT_FOUND" => AuthError::UserNotFound,
        "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "MISSING_PASSWORD" => {
            AuthError::WrongPassword
        }
        _ => AuthError::Unknown(message.to_string()),
    }
}

/// Email/password auth against a Firebase project.
pub struct FirebaseAuth {
    http: reqwest::Client,
    api_key: String,
    session: RwLock<Option<AuthSession>>,
}

impl FirebaseAuth {
    pub fn new(http: reqwest::Client, api_key: &str) -> Self {
        FirebaseAuth {
            http,
            api_key: api_key.to_string(),
            session: RwLock::new(None),
        }
    }

    /// A valid ID token for the signed-in user, refreshed if it is about to expire.
    pub async fn id_token(&self) -> GatherResult<String> {
        let session = self.session.read().clone().ok_or(GatherError::NotSignedIn)?;

        if session.expires_at - chrono::Duration::seconds(EXPIRY_MARGIN_SECS) > Utc::now() {
            return Ok(session.id_token);
        }

        tracing::debug!(uid = %session.identity.uid, "refreshing id token");
        let resp = self
            .http
            .post(format!("{}?key={}", TOKEN_URL, self.api_key))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", session.refresh_token.as_str()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let err: ErrorResponse = resp.json().await?;
            return Err(map_error_message(&err.error.message).into());
        }

        let refreshed: RefreshResponse = resp.json().await?;
        let id_token = refreshed.id_token.clone();
        *self.session.write() = Some(AuthSession {
            identity: session.identity,
            id_token: refreshed.id_token,
            refresh_token: refreshed.refresh_token,
            expires_at: expires_at(&refreshed.expires_in),
        });

        Ok(id_token)
    }

    async fn password_call(
        &self,
        endpoint: &str,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        let resp = self
            .http
            .post(format!("{}/accounts:{}?key={}", IDENTITY_URL, endpoint, self.api_key))
            .json(&PasswordRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|e| AuthError::Unknown(e.to_string()))?;

        if !resp.status().is_success() {
            let err: ErrorResponse = resp
                .json()
                .await
                .map_err(|e| AuthError::Unknown(e.to_string()))?;
            return Err(map_error_message(&err.error.message));
        }

        let body: PasswordResponse = resp
            .json()
            .await
            .map_err(|e| AuthError::Unknown(e.to_string()))?;

        let identity = Identity {
            uid: body.local_id,
            email: body.email,
        };
        *self.session.write() = Some(AuthSession {
            identity: identity.clone(),
            id_token: body.id_token,
            refresh_token: body.refresh_token,
            expires_at: expires_at(&body.expires_in),
        });

        Ok(identity)
    }
}

#[async_trait]
impl AuthProvider for FirebaseAuth {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.password_call("signUp", email, password).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.password_call("signInWithPassword", email, password).await
    }

    async fn sign_out(&self) -> GatherResult<()> {
        // ID tokens are stateless; forgetting them is the whole sign-out.
        *self.session.write() = None;
        Ok(())
    }

    fn current_user(&self) -> Option<Identity> {
        self.session.read().as_ref().map(|s| s.identity.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_identity_toolkit_messages() {
        assert_eq!(map_error_message("EMAIL_EXISTS"), AuthError::EmailInUse);
        assert_eq!(map_error_message("INVALID_EMAIL"), AuthError::InvalidEmail);
        assert_eq!(
            map_error_message("WEAK_PASSWORD : Password should be at least 6 characters"),
            AuthError::WeakPassword
        );
        assert_eq!(map_error_message("EMAIL_NOT_FOUND"), AuthError::UserNotFound);
        assert_eq!(
            map_error_message("INVALID_LOGIN_CREDENTIALS"),
            AuthError::WrongPassword
        );
        assert_eq!(
            map_error_message("TOO_MANY_ATTEMPTS_TRY_LATER"),
            AuthError::Unknown("TOO_MANY_ATTEMPTS_TRY_LATER".into())
        );
    }

    #[tokio::test]
    async fn id_token_requires_sign_in() {
        let auth = FirebaseAuth::new(reqwest::Client::new(), "key");
        assert!(auth.current_user().is_none());
        assert!(matches!(auth.id_token().await, Err(GatherError::NotSignedIn)));
    }
}
