use tenancy_security::{Role, UnknownRole};
use tenant_access_sdk::{Establishment, Membership, Organization, Principal};

use super::entity::{establishment, membership, organization, principal};

impl From<principal::Model> for Principal {
    fn from(e: principal::Model) -> Self {
        Self {
            id: e.subject.into(),
            email: e.email,
            first_name: e.first_name,
            last_name: e.last_name,
            picture: e.picture,
        }
    }
}

impl From<organization::Model> for Organization {
    fn from(e: organization::Model) -> Self {
        Self {
            id: e.id.into(),
            reference: e.reference,
            name: e.name,
            active: e.active,
        }
    }
}

impl From<establishment::Model> for Establishment {
    fn from(e: establishment::Model) -> Self {
        Self {
            id: e.id.into(),
            organization_id: e.organization_id.into(),
            reference: e.reference,
            designation: e.designation,
            currency_id: e.currency_id,
            slogan: e.slogan,
            logo: e.logo,
            domain: e.domain,
            is_default: e.is_default,
            is_hidden: e.is_hidden,
        }
    }
}

/// Fails when the stored role is not one of the known names.
impl TryFrom<membership::Model> for Membership {
    type Error = UnknownRole;

    fn try_from(e: membership::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            role: e.role.parse::<Role>()?,
            principal_id: e.principal_id.into(),
            organization_id: e.organization_id.into(),
        })
    }
}
