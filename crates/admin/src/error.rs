//! Admin-related errors.

use thiserror::Error;

use spokeshop_gateway::GatewayError;

/// Which step of the product save saga a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStep {
    /// Writing the product fields.
    Product,
    /// Writing the stock count.
    Stock,
    /// Writing the shelf flag.
    Shelf,
}

impl std::fmt::Display for SaveStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Product => "product",
            Self::Stock => "stock",
            Self::Shelf => "shelf",
        };
        f.write_str(name)
    }
}

/// Errors that can occur in the admin console.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The logged-in user does not carry the admin role.
    #[error("admin access requires the ADMIN role")]
    Forbidden,

    /// A gateway call failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// A form or argument failed validation before any request was made.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The product save saga failed partway through.
    ///
    /// `compensated` reports whether the rollback (deleting a
    /// just-created product) succeeded; when `false`, a product without
    /// its inventory writes may be left behind and needs manual cleanup.
    #[error("product save failed at the {step} step: {source}")]
    SaveFailed {
        step: SaveStep,
        compensated: bool,
        source: GatewayError,
    },
}

impl AdminError {
    /// Whether this error means the stored session is no longer usable.
    #[must_use]
    pub const fn is_session_expired(&self) -> bool {
        matches!(
            self,
            Self::Gateway(e) | Self::SaveFailed { source: e, .. } if e.is_unauthorized()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_failed_display_names_step() {
        let err = AdminError::SaveFailed {
            step: SaveStep::Stock,
            compensated: true,
            source: GatewayError::Api {
                status: 500,
                message: "boom".to_string(),
            },
        };
        assert!(err.to_string().contains("stock step"));
    }
}
