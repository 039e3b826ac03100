use crate::decision::GrantedScope;
use crate::ids::{EstablishmentId, OrganizationId};

/// Set of organizations and establishments a query may touch.
///
/// An empty scope (no organizations) is "deny all". Establishment ids only
/// narrow a scope further; they never widen it on their own.
#[derive(Clone, Debug, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct AccessScope {
    pub(crate) organization_ids: Vec<OrganizationId>,
    pub(crate) establishment_ids: Vec<EstablishmentId>,
}

impl AccessScope {
    #[inline]
    #[must_use]
    pub fn organization_ids(&self) -> &[OrganizationId] {
        &self.organization_ids
    }

    #[inline]
    #[must_use]
    pub fn establishment_ids(&self) -> &[EstablishmentId] {
        &self.establishment_ids
    }

    /// Returns true when no organization is in scope.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.organization_ids.is_empty()
    }

    #[must_use]
    pub fn has_establishments(&self) -> bool {
        !self.establishment_ids.is_empty()
    }

    #[must_use]
    pub fn organizations_only(organization_ids: Vec<OrganizationId>) -> Self {
        Self {
            organization_ids,
            establishment_ids: vec![],
        }
    }

    #[must_use]
    pub fn organization(organization_id: OrganizationId) -> Self {
        Self::organizations_only(vec![organization_id])
    }

    #[must_use]
    pub fn both(
        organization_ids: Vec<OrganizationId>,
        establishment_ids: Vec<EstablishmentId>,
    ) -> Self {
        Self {
            organization_ids,
            establishment_ids,
        }
    }

    /// True when a row owned by `organization` falls inside this scope.
    ///
    /// Establishment ids only narrow rows that belong to an establishment;
    /// organization-level rows pass on the organization check alone.
    #[must_use]
    pub fn contains(&self, organization: &str, establishment: Option<&str>) -> bool {
        if !self.organization_ids.iter().any(|o| o == organization) {
            return false;
        }
        match establishment {
            Some(etb) if self.has_establishments() => {
                self.establishment_ids.iter().any(|e| e == etb)
            }
            _ => true,
        }
    }
}

impl From<&GrantedScope> for AccessScope {
    fn from(granted: &GrantedScope) -> Self {
        Self {
            organization_ids: vec![granted.organization_id().clone()],
            establishment_ids: granted.establishment_id().cloned().into_iter().collect(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn default_scope_denies_everything() {
        let scope = AccessScope::default();
        assert!(scope.is_empty());
        assert!(!scope.contains("org-a", None));
    }

    #[test]
    fn organization_scope_ignores_establishment() {
        let scope = AccessScope::organization(OrganizationId::new("org-a"));
        assert!(scope.contains("org-a", None));
        assert!(scope.contains("org-a", Some("etb-x")));
        assert!(!scope.contains("org-b", None));
    }

    #[test]
    fn establishment_ids_narrow_the_scope() {
        let scope = AccessScope::both(
            vec![OrganizationId::new("org-a")],
            vec![EstablishmentId::new("etb-a")],
        );
        assert!(scope.has_establishments());
        assert!(scope.contains("org-a", Some("etb-a")));
        assert!(!scope.contains("org-a", Some("etb-b")));
        assert!(scope.contains("org-a", None));
        assert!(!scope.contains("org-b", Some("etb-a")));
    }

    #[test]
    fn establishments_alone_do_not_grant_access() {
        let scope = AccessScope::both(vec![], vec![EstablishmentId::new("etb-a")]);
        assert!(scope.is_empty());
        assert!(!scope.contains("org-a", Some("etb-a")));
    }
}
