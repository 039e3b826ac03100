//! First-login tenant bootstrap.

use std::sync::Arc;

use tenancy_security::PrincipalId;
use tenant_access_sdk::{NewTenant, ProvisionedTenant};

use super::error::DomainError;
use super::ids::IdGenerator;
use super::repo::TenantRepository;
use super::slug::slugify;
use crate::config::ProvisioningConfig;

/// Business domain stamped on provisioned establishments.
pub const ESTABLISHMENT_DOMAIN: &str = "BUSINESS";

/// Sub-resources every new establishment starts with, so catalog operations
/// always have a default to point at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultResource {
    Deposit {
        id: String,
        reference: String,
        designation: String,
        kind: String,
    },
    Unit {
        id: String,
        reference: String,
        designation: String,
    },
}

impl DefaultResource {
    #[must_use]
    pub fn standard_set(ids: &dyn IdGenerator) -> Vec<Self> {
        vec![
            Self::Deposit {
                id: format!("depo-{}", ids.generate()),
                reference: "DEP00001".to_owned(),
                designation: "Default Deposit".to_owned(),
                kind: "STORE".to_owned(),
            },
            Self::Unit {
                id: format!("unit-{}", ids.generate()),
                reference: "U".to_owned(),
                designation: "Unit".to_owned(),
            },
        ]
    }
}

/// Validated input for [`TenantRepository::provision`]. Ids are allocated by
/// the repository inside its transaction.
#[derive(Debug, Clone)]
pub struct TenantBlueprint {
    pub principal_id: PrincipalId,
    pub display_name: String,
    pub slug: String,
    pub currency_id: String,
    pub slogan: Option<String>,
    pub logo: Option<String>,
    pub naming: ProvisioningConfig,
    pub defaults: Vec<DefaultResource>,
}

pub struct ProvisioningWorkflow {
    tenants: Arc<dyn TenantRepository>,
    ids: Arc<dyn IdGenerator>,
    naming: ProvisioningConfig,
}

impl ProvisioningWorkflow {
    #[must_use]
    pub fn new(
        tenants: Arc<dyn TenantRepository>,
        ids: Arc<dyn IdGenerator>,
        naming: ProvisioningConfig,
    ) -> Self {
        Self {
            tenants,
            ids,
            naming,
        }
    }

    /// # Errors
    /// `Validation` before any write; `Conflict` when a concurrent call won
    /// the same id; `Database` for other storage failures.
    #[tracing::instrument(skip(self, principal, request), fields(principal_id = %principal))]
    pub async fn provision(
        &self,
        principal: &PrincipalId,
        request: NewTenant,
    ) -> Result<ProvisionedTenant, DomainError> {
        let blueprint = self.blueprint(principal, request)?;

        match self.tenants.provision(blueprint).await {
            Ok(provisioned) => {
                tracing::info!(
                    organization_id = %provisioned.organization.id,
                    establishment_id = %provisioned.establishment.id,
                    "tenant provisioned"
                );
                Ok(provisioned)
            }
            Err(e) => {
                tracing::warn!(error = %e, "tenant provisioning rolled back");
                Err(e)
            }
        }
    }

    /// # Errors
    /// `Validation` for a blank display name or currency.
    pub fn blueprint(
        &self,
        principal: &PrincipalId,
        request: NewTenant,
    ) -> Result<TenantBlueprint, DomainError> {
        let display_name = request.display_name.trim();
        if display_name.is_empty() {
            return Err(DomainError::validation("display_name", "must not be empty"));
        }
        let currency_id = request.currency_id.trim();
        if currency_id.is_empty() {
            return Err(DomainError::validation("currency_id", "must not be empty"));
        }
        let slug = slugify(display_name);
        if slug.is_empty() {
            return Err(DomainError::validation(
                "display_name",
                "must contain at least one ASCII letter or digit",
            ));
        }

        Ok(TenantBlueprint {
            principal_id: principal.clone(),
            display_name: display_name.to_owned(),
            slug,
            currency_id: currency_id.to_owned(),
            slogan: non_blank(request.slogan),
            logo: non_blank(request.logo),
            naming: self.naming.clone(),
            defaults: DefaultResource::standard_set(self.ids.as_ref()),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::domain::ids::NanoIdGenerator;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tenancy_security::{EstablishmentId, OrganizationId};
    use tenant_access_sdk::{Establishment, Organization};

    #[derive(Default)]
    struct RecordingTenants {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TenantRepository for RecordingTenants {
        async fn organizations(
            &self,
            _ids: &[OrganizationId],
        ) -> Result<Vec<Organization>, DomainError> {
            Ok(vec![])
        }

        async fn establishments_of(
            &self,
            _organization: &OrganizationId,
        ) -> Result<Vec<Establishment>, DomainError> {
            Ok(vec![])
        }

        async fn establishment_owner(
            &self,
            _establishment: &EstablishmentId,
        ) -> Result<Option<OrganizationId>, DomainError> {
            Ok(None)
        }

        async fn provision(
            &self,
            _blueprint: TenantBlueprint,
        ) -> Result<ProvisionedTenant, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(DomainError::Conflict("organizations.id".to_owned()))
        }
    }

    fn workflow(tenants: Arc<RecordingTenants>) -> ProvisioningWorkflow {
        ProvisioningWorkflow::new(
            tenants,
            Arc::new(NanoIdGenerator),
            ProvisioningConfig::default(),
        )
    }

    #[test]
    fn blueprint_trims_and_slugs_input() {
        let wf = workflow(Arc::new(RecordingTenants::default()));
        let request = NewTenant::new("  Acme Corp ", " USD ")
            .with_branding(Some("  ".to_owned()), Some(" logo.png ".to_owned()));

        let bp = wf.blueprint(&PrincipalId::new("u1"), request).unwrap();
        assert_eq!(bp.display_name, "Acme Corp");
        assert_eq!(bp.slug, "acme-corp");
        assert_eq!(bp.currency_id, "USD");
        assert_eq!(bp.slogan, None);
        assert_eq!(bp.logo.as_deref(), Some("logo.png"));
        assert_eq!(bp.defaults.len(), 2);
    }

    #[test]
    fn default_resources_use_prefixed_random_ids() {
        let defaults = DefaultResource::standard_set(&NanoIdGenerator);
        let DefaultResource::Deposit { id, reference, kind, .. } = &defaults[0] else {
            panic!("first default must be the deposit");
        };
        assert!(id.starts_with("depo-"));
        assert_eq!(reference, "DEP00001");
        assert_eq!(kind, "STORE");
        let DefaultResource::Unit { id, reference, .. } = &defaults[1] else {
            panic!("second default must be the unit");
        };
        assert!(id.starts_with("unit-"));
        assert_eq!(reference, "U");
    }

    #[tokio::test]
    async fn blank_fields_fail_before_any_write() {
        let tenants = Arc::new(RecordingTenants::default());
        let wf = workflow(tenants.clone());
        let principal = PrincipalId::new("u1");

        for (name, currency, field) in [
            ("   ", "USD", "display_name"),
            ("Acme", " ", "currency_id"),
            ("\u{2605}", "USD", "display_name"),
        ] {
            let err = wf
                .provision(&principal, NewTenant::new(name, currency))
                .await
                .unwrap_err();
            assert!(
                matches!(err, DomainError::Validation { field: f, .. } if f == field),
                "{err}"
            );
        }
        assert_eq!(tenants.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn repository_errors_propagate() {
        let tenants = Arc::new(RecordingTenants::default());
        let wf = workflow(tenants.clone());

        let err = wf
            .provision(&PrincipalId::new("u1"), NewTenant::new("Acme", "USD"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(tenants.calls.load(Ordering::SeqCst), 1);
    }
}
