//! Module wiring: connect, migrate, build services.

use std::sync::Arc;

use anyhow::Context;
use sea_orm_migration::MigratorTrait;
use tenancy_db::{ConnectOpts, SecureConn, connect};
use tenant_access_sdk::{IdentityVerifier, TenantAccessClient};

use crate::config::{ConfigError, TenantAccessConfig};
use crate::domain::{
    IdGenerator, NanoIdGenerator, ScopeGateway, Service, ServiceDeps, TenantAccessLocalClient,
};
use crate::infra::jwt::JwtIdentityVerifier;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::{
    SeaOrmMembershipRepository, SeaOrmPrincipalRepository, SeaOrmTenantRepository,
};

/// Running tenant-access module.
pub struct TenantAccessModule {
    db: SecureConn,
    service: Arc<Service>,
    client: Arc<dyn TenantAccessClient>,
}

impl TenantAccessModule {
    /// Initialize with the HS256 verifier built from `config.identity`.
    ///
    /// # Errors
    /// Fails if the identity secret is empty, the database is unreachable or
    /// migrations fail.
    pub async fn init(config: &TenantAccessConfig) -> anyhow::Result<Self> {
        if config.identity.secret.is_empty() {
            return Err(ConfigError::MissingSecret.into());
        }
        let verifier = JwtIdentityVerifier::hs256(
            config.identity.secret.as_bytes(),
            config.identity.issuer.as_deref(),
            config.identity.leeway_seconds,
        );
        Self::init_with(config, Arc::new(verifier), Arc::new(NanoIdGenerator)).await
    }

    /// Initialize with caller-supplied collaborators.
    ///
    /// # Errors
    /// Fails if the database is unreachable or migrations fail.
    pub async fn init_with(
        config: &TenantAccessConfig,
        verifier: Arc<dyn IdentityVerifier>,
        ids: Arc<dyn IdGenerator>,
    ) -> anyhow::Result<Self> {
        let opts = ConnectOpts {
            max_connections: config.max_connections,
            ..ConnectOpts::default()
        };
        let db = connect(&config.database_url, &opts)
            .await
            .context("failed to connect to tenant-access database")?;

        Migrator::up(db.conn(), None)
            .await
            .context("failed to run tenant-access migrations")?;
        tracing::info!(engine = db.db_engine(), "tenant-access schema up to date");

        let deps = ServiceDeps {
            verifier,
            principals: Arc::new(SeaOrmPrincipalRepository::new(db.clone())),
            memberships: Arc::new(SeaOrmMembershipRepository::new(db.clone())),
            tenants: Arc::new(SeaOrmTenantRepository::new(db.clone())),
            ids,
            db: db.clone(),
        };
        let service = Arc::new(Service::new(deps, config.provisioning.clone()));
        let client: Arc<dyn TenantAccessClient> =
            Arc::new(TenantAccessLocalClient::new(Arc::clone(&service)));

        Ok(Self {
            db,
            service,
            client,
        })
    }

    #[must_use]
    pub fn service(&self) -> &Arc<Service> {
        &self.service
    }

    #[must_use]
    pub fn client(&self) -> Arc<dyn TenantAccessClient> {
        Arc::clone(&self.client)
    }

    #[must_use]
    pub fn gateway(&self) -> &ScopeGateway {
        self.service.gateway()
    }

    #[must_use]
    pub fn db(&self) -> &SecureConn {
        &self.db
    }
}
