//! Application state shared across handlers.

use std::sync::Arc;

use lettre::transport::smtp::Error as SmtpError;
use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::db::Stores;
use crate::services::email::{Mailer, SmtpMailer};
use crate::services::token::SessionTokens;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the stores, token signer and configuration.
/// Everything in it is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    stores: Stores,
    tokens: SessionTokens,
    mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Create the production state: `PostgreSQL` stores and SMTP delivery.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP relay configuration is invalid.
    pub fn new(config: StorefrontConfig, pool: &PgPool) -> Result<Self, SmtpError> {
        let mailer = SmtpMailer::new(&config.email)?;
        Ok(Self::from_parts(config, Stores::postgres(pool), Arc::new(mailer)))
    }

    /// Assemble state from already-built parts.
    #[must_use]
    pub fn from_parts(config: StorefrontConfig, stores: Stores, mailer: Arc<dyn Mailer>) -> Self {
        let tokens = SessionTokens::new(&config.token_secret);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                stores,
                tokens,
                mailer,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn stores(&self) -> &Stores {
        &self.inner.stores
    }

    /// Get a reference to the session token signer.
    #[must_use]
    pub fn tokens(&self) -> &SessionTokens {
        &self.inner.tokens
    }

    #[must_use]
    pub fn mailer(&self) -> &dyn Mailer {
        self.inner.mailer.as_ref()
    }
}

/// State over in-memory stores with a recording mailer.
#[cfg(test)]
pub fn test_state() -> (AppState, Arc<crate::services::email::RecordingMailer>) {
    let mailer = Arc::new(crate::services::email::RecordingMailer::default());
    let state = test_state_with_mailer(mailer.clone());
    (state, mailer)
}

/// State over in-memory stores with the given mailer.
#[cfg(test)]
pub fn test_state_with_mailer(mailer: Arc<dyn Mailer>) -> AppState {
    AppState::from_parts(crate::config::test_config(), Stores::in_memory(), mailer)
}

/// State over the given stores with a recording mailer.
#[cfg(test)]
pub fn test_state_with_stores(stores: Stores) -> AppState {
    AppState::from_parts(
        crate::config::test_config(),
        stores,
        Arc::new(crate::services::email::RecordingMailer::default()),
    )
}
