//! Firebase backend: Authentication plus Cloud Firestore, both over REST.

mod auth;
mod firestore;
mod value;

pub use auth::{FirebaseAuth, map_error_message};
pub use firestore::Firestore;

use std::sync::Arc;

use crate::backend::Backend;
use crate::config::FirebaseConfig;
use crate::error::GatherResult;

pub struct FirebaseBackend;

impl FirebaseBackend {
    /// Build clients for the configured project. No request is made until the
    /// first sign-in.
    pub fn connect(config: &FirebaseConfig) -> GatherResult<Backend> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        let auth = Arc::new(FirebaseAuth::new(http.clone(), &config.api_key));
        let store = Arc::new(Firestore::new(
            http,
            &config.project_id,
            auth.clone(),
            config.poll_interval(),
        ));

        tracing::debug!(project = %config.project_id, "connected to firebase");
        Ok(Backend::new(auth, store))
    }
}
