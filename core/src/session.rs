//! Signed-in user and session lifecycle.

use crate::api::{AuthApi, UserSummary};
use crate::forms::{LoginForm, RegisterForm};
use crate::store::DatasetStore;
use crate::Result;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::warn;

pub struct Session {
    auth: Arc<dyn AuthApi>,
    datasets: DatasetStore,
    user: RwLock<Option<UserSummary>>,
}

impl Session {
    pub fn new(auth: Arc<dyn AuthApi>, datasets: DatasetStore) -> Self {
        Self {
            auth,
            datasets,
            user: RwLock::new(None),
        }
    }

    pub fn current_user(&self) -> Option<UserSummary> {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub async fn login(&self, form: &LoginForm) -> Result<Option<UserSummary>> {
        let request = form.validate()?;
        let response = self.auth.login(&request).await?;
        self.set_user(response.user.clone());
        Ok(response.user)
    }

    pub async fn register(&self, form: &RegisterForm) -> Result<Option<UserSummary>> {
        let request = form.validate()?;
        let response = self.auth.register(&request).await?;
        self.set_user(response.user.clone());
        Ok(response.user)
    }

    /// End the session. Local state (user and cached datasets) is dropped
    /// even if the backend call fails.
    pub async fn logout(&self) -> Result<()> {
        let result = self.auth.logout().await;
        if let Err(e) = &result {
            warn!(target: "gateway", error = %e, "Logout request failed; clearing local session anyway");
        }
        self.set_user(None);
        self.datasets.clear_datasets();
        result
    }

    fn set_user(&self, user: Option<UserSummary>) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = user;
    }
}
