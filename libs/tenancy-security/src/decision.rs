//! The organization-level access rule.
//!
//! A decision depends only on the membership state handed in and has no side
//! effects. It is recomputed for every request; callers must not cache it
//! across requests since memberships change.

use std::fmt;

use crate::ids::{EstablishmentId, OrganizationId, PrincipalId};
use crate::role::Role;

/// The (organization, optional establishment) pair a caller wants to operate
/// on. Client supplied, so it carries no authority until evaluated.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Scope {
    pub organization_id: OrganizationId,
    pub establishment_id: Option<EstablishmentId>,
}

impl Scope {
    #[must_use]
    pub fn organization(organization_id: impl Into<OrganizationId>) -> Self {
        Self {
            organization_id: organization_id.into(),
            establishment_id: None,
        }
    }

    #[must_use]
    pub fn establishment(
        organization_id: impl Into<OrganizationId>,
        establishment_id: impl Into<EstablishmentId>,
    ) -> Self {
        Self {
            organization_id: organization_id.into(),
            establishment_id: Some(establishment_id.into()),
        }
    }
}

/// A scope that passed the access rule.
///
/// Only [`AccessDecision::evaluate`] builds one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrantedScope {
    principal_id: PrincipalId,
    scope: Scope,
    role: Role,
}

impl GrantedScope {
    #[must_use]
    pub fn principal_id(&self) -> &PrincipalId {
        &self.principal_id
    }

    #[must_use]
    pub fn organization_id(&self) -> &OrganizationId {
        &self.scope.organization_id
    }

    #[must_use]
    pub fn establishment_id(&self) -> Option<&EstablishmentId> {
        self.scope.establishment_id.as_ref()
    }

    #[must_use]
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    NotAuthenticated,
    NoOrganizationAccess,
    NoRole,
}

impl DenyReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotAuthenticated => "not authenticated",
            Self::NoOrganizationAccess => "no access to organization",
            Self::NoRole => "no role",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Memberships of one principal as read from the index at decision time.
///
/// `organizations` is the allow-list. `roles` may lack an entry for an
/// allowed organization when the stored role could not be read.
/// `establishment_owner` is the organization owning the requested
/// establishment, `None` when it does not exist or was not looked up.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MembershipSnapshot {
    pub organizations: Vec<OrganizationId>,
    pub roles: Vec<(OrganizationId, Role)>,
    pub establishment_owner: Option<OrganizationId>,
}

impl MembershipSnapshot {
    #[must_use]
    pub fn grants_organization(&self, organization_id: &OrganizationId) -> bool {
        self.organizations.contains(organization_id)
    }

    #[must_use]
    pub fn role_in(&self, organization_id: &OrganizationId) -> Option<Role> {
        self.roles
            .iter()
            .find(|(org, _)| org == organization_id)
            .map(|(_, role)| *role)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccessDecision {
    Denied(DenyReason),
    Allowed(GrantedScope),
}

impl AccessDecision {
    /// Apply the access rule.
    ///
    /// Establishment ids are not checked against memberships: access to an
    /// organization implies access to all of its establishments. A requested
    /// establishment must belong to the requested organization.
    #[must_use]
    pub fn evaluate(
        principal: Option<&PrincipalId>,
        requested: &Scope,
        memberships: &MembershipSnapshot,
    ) -> Self {
        let Some(principal_id) = principal else {
            return Self::Denied(DenyReason::NotAuthenticated);
        };
        if !memberships.grants_organization(&requested.organization_id) {
            return Self::Denied(DenyReason::NoOrganizationAccess);
        }
        if requested.establishment_id.is_some()
            && memberships.establishment_owner.as_ref() != Some(&requested.organization_id)
        {
            return Self::Denied(DenyReason::NoOrganizationAccess);
        }
        let Some(role) = memberships.role_in(&requested.organization_id) else {
            return Self::Denied(DenyReason::NoRole);
        };
        Self::Allowed(GrantedScope {
            principal_id: principal_id.clone(),
            scope: requested.clone(),
            role,
        })
    }

    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed(_))
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        match self {
            Self::Allowed(granted) => Some(granted.role()),
            Self::Denied(_) => None,
        }
    }

    #[must_use]
    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Self::Denied(reason) => Some(*reason),
            Self::Allowed(_) => None,
        }
    }
}
