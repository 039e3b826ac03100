//! Transport-agnostic models.

use serde::{Deserialize, Serialize};

use tenancy_security::{EstablishmentId, OrganizationId, PrincipalId, Role};

/// Profile claims as reported by the identity provider. All optional: a
/// missing claim leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileClaims {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub picture: Option<String>,
}

/// Output of an [`IdentityVerifier`](crate::IdentityVerifier).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    pub subject: String,
    pub profile: ProfileClaims,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub reference: String,
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Establishment {
    pub id: EstablishmentId,
    pub organization_id: OrganizationId,
    pub reference: String,
    pub designation: String,
    pub currency_id: String,
    pub slogan: Option<String>,
    pub logo: Option<String>,
    pub domain: String,
    pub is_default: bool,
    pub is_hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub principal_id: PrincipalId,
    pub organization_id: OrganizationId,
    pub role: Role,
}

/// Provisioning request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTenant {
    pub display_name: String,
    pub currency_id: String,
    pub slogan: Option<String>,
    pub logo: Option<String>,
}

impl NewTenant {
    #[must_use]
    pub fn new(display_name: impl Into<String>, currency_id: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            currency_id: currency_id.into(),
            slogan: None,
            logo: None,
        }
    }

    #[must_use]
    pub fn with_branding(mut self, slogan: Option<String>, logo: Option<String>) -> Self {
        self.slogan = slogan;
        self.logo = logo;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionedTenant {
    pub organization: Organization,
    pub establishment: Establishment,
}

/// One entry of the login/bootstrap read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationAccess {
    pub organization: Organization,
    pub role: Role,
    pub establishments: Vec<Establishment>,
}
