use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ConnectionTrait, DatabaseTransaction, EntityTrait, Order,
    QuerySelect,
};
use tenancy_db::{AccessScope, SecureConn, secure_insert};
use tenancy_security::{EstablishmentId, OrganizationId, Role};
use tenant_access_sdk::{Establishment, Organization, ProvisionedTenant};

use crate::domain::error::DomainError;
use crate::domain::provisioning::{DefaultResource, ESTABLISHMENT_DOMAIN, TenantBlueprint};
use crate::domain::repo::TenantRepository;
use crate::domain::slug::{Identifiers, Naming, allocate};

use super::entity::{deposit, establishment, membership, organization, unit};

pub struct SeaOrmTenantRepository {
    db: SecureConn,
}

impl SeaOrmTenantRepository {
    #[must_use]
    pub fn new(db: SecureConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TenantRepository for SeaOrmTenantRepository {
    async fn organizations(
        &self,
        ids: &[OrganizationId],
    ) -> Result<Vec<Organization>, DomainError> {
        let scope = AccessScope::organizations_only(ids.to_vec());
        let rows = self
            .db
            .find::<organization::Entity>(&scope)
            .all(self.db.conn())
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn establishments_of(
        &self,
        organization: &OrganizationId,
    ) -> Result<Vec<Establishment>, DomainError> {
        let scope = AccessScope::organization(organization.clone());
        let rows = self
            .db
            .find::<establishment::Entity>(&scope)
            .order_by(establishment::Column::CreatedAt, Order::Asc)
            .order_by(establishment::Column::Id, Order::Asc)
            .all(self.db.conn())
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn establishment_owner(
        &self,
        establishment: &EstablishmentId,
    ) -> Result<Option<OrganizationId>, DomainError> {
        let owner: Option<String> = establishment::Entity::find_by_id(establishment.as_str())
            .select_only()
            .column(establishment::Column::OrganizationId)
            .into_tuple()
            .one(self.db.conn())
            .await?;
        Ok(owner.map(OrganizationId::new))
    }

    async fn provision(
        &self,
        blueprint: TenantBlueprint,
    ) -> Result<ProvisionedTenant, DomainError> {
        self.db
            .in_transaction_mapped(DomainError::from_infra, move |tx| {
                Box::pin(async move { write_tenant(tx, &blueprint).await })
            })
            .await
    }
}

/// Every write of one provisioning call. Runs inside the caller's
/// transaction; any error rolls all of them back.
async fn write_tenant(
    tx: &DatabaseTransaction,
    blueprint: &TenantBlueprint,
) -> Result<ProvisionedTenant, DomainError> {
    let naming = &blueprint.naming;

    let (org_ids, org_refs) = taken::<organization::Entity, _>(
        tx,
        organization::Column::Id,
        organization::Column::Reference,
    )
    .await?;
    let org = allocate(
        Naming {
            id_prefix: &naming.organization_id_prefix,
            reference_prefix: &naming.organization_reference_prefix,
        },
        &blueprint.slug,
        &org_ids,
        &org_refs,
    );

    let (etb_ids, etb_refs) = taken::<establishment::Entity, _>(
        tx,
        establishment::Column::Id,
        establishment::Column::Reference,
    )
    .await?;
    let etb = allocate(
        Naming {
            id_prefix: &naming.establishment_id_prefix,
            reference_prefix: &naming.establishment_reference_prefix,
        },
        &blueprint.slug,
        &etb_ids,
        &etb_refs,
    );
    tracing::debug!(
        organization_id = %org.id,
        establishment_id = %etb.id,
        "allocated tenant identifiers"
    );

    let scope = AccessScope::both(
        vec![OrganizationId::new(org.id.clone())],
        vec![EstablishmentId::new(etb.id.clone())],
    );
    let now = Utc::now();

    let organization = secure_insert::<organization::Entity, _>(
        &scope,
        organization_row(&org, blueprint, now),
        tx,
    )
    .await?;
    let establishment = secure_insert::<establishment::Entity, _>(
        &scope,
        establishment_row(&etb, &org, blueprint, now),
        tx,
    )
    .await?;

    for resource in &blueprint.defaults {
        insert_default(tx, &scope, &org.id, &etb.id, resource, now).await?;
    }

    membership::ActiveModel {
        id: ActiveValue::NotSet,
        principal_id: ActiveValue::Set(blueprint.principal_id.as_str().to_owned()),
        organization_id: ActiveValue::Set(org.id.clone()),
        role: ActiveValue::Set(Role::SuperAdmin.as_str().to_owned()),
        created_at: ActiveValue::Set(now),
    }
    .insert(tx)
    .await?;

    Ok(ProvisionedTenant {
        organization: organization.into(),
        establishment: establishment.into(),
    })
}

/// Ids and references already in use, read inside the transaction.
async fn taken<E, C>(
    conn: &C,
    id_col: E::Column,
    reference_col: E::Column,
) -> Result<(HashSet<String>, HashSet<String>), DomainError>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let rows: Vec<(String, String)> = E::find()
        .select_only()
        .column(id_col)
        .column(reference_col)
        .into_tuple()
        .all(conn)
        .await?;
    Ok(rows.into_iter().unzip())
}

fn organization_row(
    ids: &Identifiers,
    blueprint: &TenantBlueprint,
    now: DateTime<Utc>,
) -> organization::ActiveModel {
    organization::ActiveModel {
        id: ActiveValue::Set(ids.id.clone()),
        reference: ActiveValue::Set(ids.reference.clone()),
        name: ActiveValue::Set(blueprint.display_name.clone()),
        active: ActiveValue::Set(true),
        created_at: ActiveValue::Set(now),
    }
}

fn establishment_row(
    ids: &Identifiers,
    org: &Identifiers,
    blueprint: &TenantBlueprint,
    now: DateTime<Utc>,
) -> establishment::ActiveModel {
    establishment::ActiveModel {
        id: ActiveValue::Set(ids.id.clone()),
        organization_id: ActiveValue::Set(org.id.clone()),
        reference: ActiveValue::Set(ids.reference.clone()),
        designation: ActiveValue::Set(blueprint.display_name.clone()),
        currency_id: ActiveValue::Set(blueprint.currency_id.clone()),
        slogan: ActiveValue::Set(blueprint.slogan.clone()),
        logo: ActiveValue::Set(blueprint.logo.clone()),
        domain: ActiveValue::Set(ESTABLISHMENT_DOMAIN.to_owned()),
        is_default: ActiveValue::Set(true),
        is_hidden: ActiveValue::Set(false),
        created_at: ActiveValue::Set(now),
    }
}

async fn insert_default(
    tx: &DatabaseTransaction,
    scope: &AccessScope,
    organization_id: &str,
    establishment_id: &str,
    resource: &DefaultResource,
    now: DateTime<Utc>,
) -> Result<(), DomainError> {
    match resource {
        DefaultResource::Deposit {
            id,
            reference,
            designation,
            kind,
        } => {
            let am = deposit::ActiveModel {
                id: ActiveValue::Set(id.clone()),
                organization_id: ActiveValue::Set(organization_id.to_owned()),
                establishment_id: ActiveValue::Set(establishment_id.to_owned()),
                reference: ActiveValue::Set(reference.clone()),
                designation: ActiveValue::Set(designation.clone()),
                deposit_type: ActiveValue::Set(kind.clone()),
                is_default: ActiveValue::Set(true),
                created_at: ActiveValue::Set(now),
            };
            secure_insert::<deposit::Entity, _>(scope, am, tx).await?;
        }
        DefaultResource::Unit {
            id,
            reference,
            designation,
        } => {
            let am = unit::ActiveModel {
                id: ActiveValue::Set(id.clone()),
                organization_id: ActiveValue::Set(organization_id.to_owned()),
                establishment_id: ActiveValue::Set(establishment_id.to_owned()),
                reference: ActiveValue::Set(reference.clone()),
                designation: ActiveValue::Set(designation.clone()),
                created_at: ActiveValue::Set(now),
            };
            secure_insert::<unit::Entity, _>(scope, am, tx).await?;
        }
    }
    Ok(())
}
