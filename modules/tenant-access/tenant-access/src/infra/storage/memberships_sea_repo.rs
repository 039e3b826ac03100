use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, sea_query::OnConflict,
};
use tenancy_db::SecureConn;
use tenancy_security::{OrganizationId, PrincipalId, Role};
use tenant_access_sdk::Membership;

use crate::domain::error::DomainError;
use crate::domain::repo::MembershipRepository;

use super::entity::membership;

pub struct SeaOrmMembershipRepository {
    db: SecureConn,
}

impl SeaOrmMembershipRepository {
    #[must_use]
    pub fn new(db: SecureConn) -> Self {
        Self { db }
    }

    async fn find_row(
        &self,
        principal: &PrincipalId,
        organization: &OrganizationId,
    ) -> Result<Option<membership::Model>, DomainError> {
        Ok(membership::Entity::find()
            .filter(membership::Column::PrincipalId.eq(principal.as_str()))
            .filter(membership::Column::OrganizationId.eq(organization.as_str()))
            .one(self.db.conn())
            .await?)
    }
}

fn to_membership(row: membership::Model) -> Option<Membership> {
    let id = row.id;
    match Membership::try_from(row) {
        Ok(m) => Some(m),
        Err(e) => {
            tracing::warn!(
                membership_id = id,
                error = %e,
                "skipping membership with unreadable role"
            );
            None
        }
    }
}

#[async_trait]
impl MembershipRepository for SeaOrmMembershipRepository {
    async fn memberships_of(
        &self,
        principal: &PrincipalId,
    ) -> Result<Vec<Membership>, DomainError> {
        let rows = membership::Entity::find()
            .filter(membership::Column::PrincipalId.eq(principal.as_str()))
            .order_by_asc(membership::Column::Id)
            .all(self.db.conn())
            .await?;
        Ok(rows.into_iter().filter_map(to_membership).collect())
    }

    async fn organizations_of(
        &self,
        principal: &PrincipalId,
    ) -> Result<Vec<OrganizationId>, DomainError> {
        let ids: Vec<String> = membership::Entity::find()
            .select_only()
            .column(membership::Column::OrganizationId)
            .filter(membership::Column::PrincipalId.eq(principal.as_str()))
            .order_by_asc(membership::Column::Id)
            .into_tuple()
            .all(self.db.conn())
            .await?;
        Ok(ids.into_iter().map(OrganizationId::from).collect())
    }

    async fn role_of(
        &self,
        principal: &PrincipalId,
        organization: &OrganizationId,
    ) -> Result<Option<Role>, DomainError> {
        Ok(self
            .find_row(principal, organization)
            .await?
            .and_then(to_membership)
            .map(|m| m.role))
    }

    /// `ON CONFLICT DO NOTHING` on the (principal, organization) unique
    /// index, then read back whichever row won.
    async fn link(
        &self,
        principal: &PrincipalId,
        organization: &OrganizationId,
        role: Role,
    ) -> Result<Membership, DomainError> {
        let am = membership::ActiveModel {
            id: ActiveValue::NotSet,
            principal_id: ActiveValue::Set(principal.as_str().to_owned()),
            organization_id: ActiveValue::Set(organization.as_str().to_owned()),
            role: ActiveValue::Set(role.as_str().to_owned()),
            created_at: ActiveValue::Set(Utc::now()),
        };
        let inserted = membership::Entity::insert(am)
            .on_conflict(
                OnConflict::columns([
                    membership::Column::PrincipalId,
                    membership::Column::OrganizationId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.db.conn())
            .await?;
        tracing::trace!(inserted, "membership link written");

        let row = self
            .find_row(principal, organization)
            .await?
            .ok_or_else(|| {
                DomainError::NotFound(format!("membership of {principal} in {organization}"))
            })?;
        Membership::try_from(row).map_err(|e| DomainError::Database(e.to_string()))
    }

    async fn unlink(
        &self,
        principal: &PrincipalId,
        organization: &OrganizationId,
    ) -> Result<bool, DomainError> {
        let res = membership::Entity::delete_many()
            .filter(membership::Column::PrincipalId.eq(principal.as_str()))
            .filter(membership::Column::OrganizationId.eq(organization.as_str()))
            .exec(self.db.conn())
            .await?;
        Ok(res.rows_affected > 0)
    }

    async fn set_role(
        &self,
        principal: &PrincipalId,
        organization: &OrganizationId,
        role: Role,
    ) -> Result<Option<Membership>, DomainError> {
        let Some(row) = self.find_row(principal, organization).await? else {
            return Ok(None);
        };
        let mut am: membership::ActiveModel = row.into();
        am.role = ActiveValue::Set(role.as_str().to_owned());
        let updated = am.update(self.db.conn()).await?;
        Ok(to_membership(updated))
    }
}
