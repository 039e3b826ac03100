use sea_orm::{ColumnTrait, Condition, EntityTrait, sea_query::Expr};

use crate::entity_traits::ScopableEntity;
use tenancy_security::AccessScope;

/// How a scoped query reaches its rows.
///
/// Chosen from the scope and the columns the entity declares, most specific
/// first. The shape only affects which index is used: rows outside the scope
/// are excluded on every path, by SQL or by the in-memory fallback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryShape {
    /// `organization_col IN (..) AND establishment_col IN (..)`
    ByOrganizationAndEstablishment,
    /// `organization_col IN (..)`
    ByOrganization,
    /// Full scan; rows are filtered in memory afterwards.
    Unfiltered,
}

impl QueryShape {
    #[must_use]
    pub fn for_entity<E: ScopableEntity>(scope: &AccessScope) -> Self {
        match (E::organization_col(), E::establishment_col()) {
            (Some(_), Some(_)) if scope.has_establishments() => {
                Self::ByOrganizationAndEstablishment
            }
            (Some(_), _) => Self::ByOrganization,
            (None, _) => Self::Unfiltered,
        }
    }

    #[must_use]
    pub fn needs_in_memory_filter(self) -> bool {
        matches!(self, Self::Unfiltered)
    }
}

/// Build the SQL condition for `shape`.
///
/// An empty scope yields `false` regardless of shape.
pub fn build_scope_condition<E>(shape: QueryShape, scope: &AccessScope) -> Condition
where
    E: ScopableEntity,
    E::Column: ColumnTrait + Copy,
{
    let deny_all = || Condition::all().add(Expr::value(false));

    if scope.is_empty() {
        return deny_all();
    }

    let organizations = || {
        scope
            .organization_ids()
            .iter()
            .map(|id| id.as_str().to_owned())
            .collect::<Vec<_>>()
    };

    match shape {
        QueryShape::ByOrganizationAndEstablishment => {
            let (Some(org_col), Some(etb_col)) = (E::organization_col(), E::establishment_col())
            else {
                return deny_all();
            };
            let establishments: Vec<String> = scope
                .establishment_ids()
                .iter()
                .map(|id| id.as_str().to_owned())
                .collect();
            Condition::all()
                .add(Expr::col(org_col).is_in(organizations()))
                .add(Expr::col(etb_col).is_in(establishments))
        }
        QueryShape::ByOrganization => match E::organization_col() {
            Some(org_col) => Condition::all().add(Expr::col(org_col).is_in(organizations())),
            None => deny_all(),
        },
        QueryShape::Unfiltered => Condition::all(),
    }
}
