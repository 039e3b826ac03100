use crate::access_scope::AccessScope;

/// A row or value that belongs to exactly one organization.
///
/// Used for the in-memory fallback filter when a query could not be narrowed
/// ahead of time.
pub trait OrganizationOwned {
    fn organization_id(&self) -> &str;

    fn establishment_id(&self) -> Option<&str> {
        None
    }
}

/// Keep only the items that fall inside `scope`.
#[must_use]
pub fn retain_owned_by<T: OrganizationOwned>(items: Vec<T>, scope: &AccessScope) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| scope.contains(item.organization_id(), item.establishment_id()))
        .collect()
}
