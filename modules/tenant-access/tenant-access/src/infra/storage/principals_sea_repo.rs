use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveValue, EntityTrait, sea_query::OnConflict};
use tenancy_db::SecureConn;
use tenancy_security::PrincipalId;
use tenant_access_sdk::{Principal, VerifiedIdentity};

use crate::domain::error::DomainError;
use crate::domain::repo::PrincipalRepository;

use super::entity::principal;

pub struct SeaOrmPrincipalRepository {
    db: SecureConn,
}

impl SeaOrmPrincipalRepository {
    #[must_use]
    pub fn new(db: SecureConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PrincipalRepository for SeaOrmPrincipalRepository {
    /// Single `INSERT .. ON CONFLICT (subject) DO UPDATE`, so concurrent first
    /// logins of one subject converge on one row. Claims missing from the
    /// credential keep their stored value.
    async fn upsert(&self, identity: &VerifiedIdentity) -> Result<Principal, DomainError> {
        let now = Utc::now();
        let profile = &identity.profile;

        let mut refreshed = vec![principal::Column::LastLoginAt];
        for (column, value) in [
            (principal::Column::Email, &profile.email),
            (principal::Column::FirstName, &profile.first_name),
            (principal::Column::LastName, &profile.last_name),
            (principal::Column::Picture, &profile.picture),
        ] {
            if value.is_some() {
                refreshed.push(column);
            }
        }

        let am = principal::ActiveModel {
            subject: ActiveValue::Set(identity.subject.clone()),
            email: ActiveValue::Set(profile.email.clone()),
            first_name: ActiveValue::Set(profile.first_name.clone()),
            last_name: ActiveValue::Set(profile.last_name.clone()),
            picture: ActiveValue::Set(profile.picture.clone()),
            created_at: ActiveValue::Set(now),
            last_login_at: ActiveValue::Set(now),
        };

        principal::Entity::insert(am)
            .on_conflict(
                OnConflict::column(principal::Column::Subject)
                    .update_columns(refreshed)
                    .to_owned(),
            )
            .exec_without_returning(self.db.conn())
            .await?;

        principal::Entity::find_by_id(identity.subject.clone())
            .one(self.db.conn())
            .await?
            .map(Into::into)
            .ok_or_else(|| {
                DomainError::Database(format!(
                    "principal {} not readable after upsert",
                    identity.subject
                ))
            })
    }

    async fn find(&self, id: &PrincipalId) -> Result<Option<Principal>, DomainError> {
        let row = principal::Entity::find_by_id(id.as_str().to_owned())
            .one(self.db.conn())
            .await?;
        Ok(row.map(Into::into))
    }
}
