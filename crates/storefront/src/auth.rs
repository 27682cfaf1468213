//! Registration, login, and session lifecycle.

use chrono::Utc;
use rand::Rng;
use tracing::{info, instrument, warn};

use spokeshop_core::Role;
use spokeshop_gateway::types::{Registration, User};
use spokeshop_gateway::{GatewayClient, GatewayError};

use crate::error::StorefrontError;
use crate::session::SessionStore;

/// Registration form as the user fills it in.
#[derive(Debug, Clone)]
pub struct RegistrationForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub phone: String,
    pub age: u32,
}

impl RegistrationForm {
    fn validate(&self) -> Result<(), StorefrontError> {
        if self.username.trim().is_empty() {
            return Err(StorefrontError::Validation(
                "username must not be empty".to_string(),
            ));
        }
        if self.password.is_empty() {
            return Err(StorefrontError::Validation(
                "password must not be empty".to_string(),
            ));
        }
        if self.password != self.confirm_password {
            return Err(StorefrontError::Validation(
                "passwords do not match".to_string(),
            ));
        }
        if self.phone.trim().is_empty() {
            return Err(StorefrontError::Validation(
                "phone must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Authentication state shared by the storefront and admin console.
///
/// Owns the session store. On construction any persisted token is
/// re-installed on the gateway client, so a restart keeps the user
/// logged in until the gateway says otherwise.
#[derive(Debug)]
pub struct AuthService {
    gateway: GatewayClient,
    store: SessionStore,
}

impl AuthService {
    /// Wrap a gateway client and session store, restoring any saved session.
    #[must_use]
    pub fn new(gateway: GatewayClient, store: SessionStore) -> Self {
        if let Some(token) = store.token() {
            gateway.set_token(token);
        }
        Self { gateway, store }
    }

    /// The gateway client this service installs tokens on.
    #[must_use]
    pub const fn gateway(&self) -> &GatewayClient {
        &self.gateway
    }

    /// The logged-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.store.current_user()
    }

    /// Whether a session is present locally.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.store.token().is_some() && self.store.current_user().is_some()
    }

    /// Whether the logged-in user has the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.current_user().is_some_and(|u| u.role.is_admin())
    }

    /// Register a new shopper account.
    ///
    /// The secondary user id is generated client-side; accounts created
    /// through the storefront always get the shopper role.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any request is made, or a gateway
    /// error (e.g. duplicate username) from the registration call.
    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn register(&self, form: &RegistrationForm) -> Result<(), StorefrontError> {
        form.validate()?;
        let registration = Registration {
            user_id: generate_user_id(),
            username: form.username.trim().to_owned(),
            password: form.password.clone(),
            phone: form.phone.trim().to_owned(),
            age: form.age,
            role: Role::User,
        };
        self.gateway.register(&registration).await?;
        info!("account registered");
        Ok(())
    }

    /// Log in and persist the session.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::InvalidCredentials`] if the gateway
    /// rejects the credentials, or other gateway/store errors.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(&mut self, username: &str, password: &str) -> Result<User, StorefrontError> {
        let response = self.gateway.login(username, password).await.map_err(|e| {
            // A 401 here is bad credentials, not an expired session
            if e.is_unauthorized() {
                StorefrontError::InvalidCredentials
            } else {
                StorefrontError::from(e)
            }
        })?;

        self.store.set_session(&response.token, &response.user)?;
        self.gateway.set_token(response.token);
        info!(role = %response.user.role, "logged in");
        Ok(response.user)
    }

    /// Log out: drop the token and the stored session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file cannot be written.
    pub fn logout(&mut self) -> Result<(), StorefrontError> {
        self.gateway.clear_token();
        self.store.clear_session()?;
        Ok(())
    }

    /// Clear local state after the gateway rejected the session.
    ///
    /// A failure to update the session file is logged rather than
    /// propagated; the in-memory token is gone either way.
    pub fn expire_session(&mut self) {
        self.gateway.clear_token();
        if let Err(e) = self.store.clear_session() {
            warn!(error = %e, "failed to clear session file after expiry");
        }
    }

    pub(crate) fn map_gateway_error(&mut self, err: GatewayError) -> StorefrontError {
        let err = StorefrontError::from(err);
        if err.is_session_expired() {
            self.expire_session();
        }
        err
    }
}

/// Generate a secondary user id in the `user-<millis>-<n>` form the
/// backend expects from registrations.
#[must_use]
pub(crate) fn generate_user_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let n = rand::rng().random_range(0..1000);
    format!("user-{millis}-{n}")
}
