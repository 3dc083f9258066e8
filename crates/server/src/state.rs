//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::JwtService;
use crate::catalog::{CatalogError, CatalogHandle};
use crate::commands::AdminRegistry;
use crate::config::LastCallConfig;
use crate::db::DrinkRepository;
use crate::queue::OrderQueue;
use crate::services::dispatcher::Dispatcher;
use crate::services::optout::OptOutRegistry;
use crate::services::whatsapp::WhatsAppError;

/// Error assembling the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("whatsapp client error: {0}")]
    WhatsApp(#[from] WhatsAppError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the database pool, the drink catalog and the
/// order queue.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: LastCallConfig,
    pool: PgPool,
    catalog: CatalogHandle,
    queue: OrderQueue,
    admins: AdminRegistry,
    opt_outs: Arc<OptOutRegistry>,
    dispatcher: Dispatcher,
    jwt: JwtService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Loads the drink catalog from `config.drinks_path` and builds the
    /// outbound clients for whichever channels are configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog fails to load or an HTTP client
    /// fails to build.
    pub fn new(config: LastCallConfig, pool: PgPool) -> Result<Self, StateError> {
        let catalog = CatalogHandle::load(config.drinks_path.clone())?;
        let opt_outs = Arc::new(OptOutRegistry::new());

        if config.admin_open_access && config.admin_numbers.is_empty() {
            tracing::warn!(
                "LASTCALL_ADMIN_OPEN_ACCESS is enabled with an empty allow-list: \
                 every sender can issue admin commands"
            );
        }

        let dispatcher = Dispatcher::new(
            config.whatsapp.as_ref(),
            config.twilio.as_ref(),
            config.push.as_ref(),
            pool.clone(),
            Arc::clone(&opt_outs),
            config.admin_numbers.clone(),
            config.menu_url.clone(),
            config.support.clone(),
        )?;

        let admins = AdminRegistry::new(config.admin_numbers.clone(), config.admin_open_access);
        let jwt = JwtService::new(&config.jwt_secret);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                catalog,
                queue: OrderQueue::new(),
                admins,
                opt_outs,
                dispatcher,
                jwt,
            }),
        })
    }

    /// Get a reference to the application configuration.
    #[must_use]
    pub fn config(&self) -> &LastCallConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a drink repository bound to the pool.
    #[must_use]
    pub fn drinks(&self) -> DrinkRepository<'_> {
        DrinkRepository::new(&self.inner.pool)
    }

    /// Get a reference to the drink catalog handle.
    #[must_use]
    pub fn catalog(&self) -> &CatalogHandle {
        &self.inner.catalog
    }

    /// Get a reference to the order queue.
    #[must_use]
    pub fn queue(&self) -> &OrderQueue {
        &self.inner.queue
    }

    /// Get a reference to the operator allow-list.
    #[must_use]
    pub fn admins(&self) -> &AdminRegistry {
        &self.inner.admins
    }

    /// Get a reference to the SMS opt-out registry.
    #[must_use]
    pub fn opt_outs(&self) -> &OptOutRegistry {
        &self.inner.opt_outs
    }

    /// Get a reference to the notification dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }

    /// Get a reference to the dashboard token service.
    #[must_use]
    pub fn jwt(&self) -> &JwtService {
        &self.inner.jwt
    }
}
