//! Module wiring and lifecycle
//!
//! Assembles repositories, the image store, the event publisher and configuration into the
//! domain [`Service`], and exposes migrations and the REST router to the hosting binary.

use crate::api::rest::{auth::AuthState, routes};
use crate::config::Config;
use crate::domain::{EventPublisher, ImageStore, Repositories, Service};
use crate::infra::storage::{sea_orm_repositories, Migrator};
use anyhow::Result;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;

/// Kasus service module
pub struct KasusServiceModule {
    service: Arc<Service>,
    auth: Arc<AuthState>,
}

impl KasusServiceModule {
    /// Build the module on top of a SeaORM connection
    pub fn init(
        db: Arc<DatabaseConnection>,
        images: Arc<dyn ImageStore>,
        event_publisher: Arc<dyn EventPublisher>,
        config: Config,
        jwt_secret: &[u8],
    ) -> Result<Self> {
        config.validate()?;
        let repos = sea_orm_repositories(db);
        let module = Self::with_repositories(repos, images, event_publisher, config, jwt_secret);
        tracing::info!("Kasus service initialized");
        Ok(module)
    }

    /// Build the module on top of arbitrary repository implementations
    pub fn with_repositories(
        repos: Repositories,
        images: Arc<dyn ImageStore>,
        event_publisher: Arc<dyn EventPublisher>,
        config: Config,
        jwt_secret: &[u8],
    ) -> Self {
        Self {
            service: Arc::new(Service::new(repos, images, event_publisher, config)),
            auth: Arc::new(AuthState::new(jwt_secret)),
        }
    }

    /// Apply pending schema migrations
    pub async fn migrate(db: &DatabaseConnection) -> Result<()> {
        Migrator::up(db, None).await?;
        tracing::info!("Kasus service migrations completed");
        Ok(())
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    pub fn auth(&self) -> Arc<AuthState> {
        self.auth.clone()
    }

    /// REST routes with authentication applied
    pub fn router(&self) -> axum::Router {
        tracing::info!("Registering kasus service REST routes");
        routes::router(self.service.clone(), self.auth.clone())
    }
}
