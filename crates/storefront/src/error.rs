//! Storefront-related errors.

use thiserror::Error;

use spokeshop_gateway::GatewayError;

use crate::session::SessionStoreError;

/// Errors that can occur in the shopper-facing application layer.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// A gateway call failed for a reason other than an invalid session.
    #[error(transparent)]
    Gateway(GatewayError),

    /// The stored session token was rejected by the gateway.
    ///
    /// By the time this surfaces the local session has already been
    /// cleared; the user must log in again.
    #[error("session expired, please log in again")]
    SessionExpired,

    /// The operation requires a logged-in user and there is none.
    #[error("not logged in")]
    NotLoggedIn,

    /// Login was rejected by the gateway.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// A form failed client-side validation before any request was made.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The local session store could not be read or written.
    #[error("session store error: {0}")]
    Store(#[from] SessionStoreError),
}

impl From<GatewayError> for StorefrontError {
    fn from(err: GatewayError) -> Self {
        if err.is_unauthorized() {
            Self::SessionExpired
        } else {
            Self::Gateway(err)
        }
    }
}

impl StorefrontError {
    /// Whether this error means the stored session is no longer usable.
    #[must_use]
    pub const fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }
}
