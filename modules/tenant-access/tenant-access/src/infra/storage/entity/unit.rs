use sea_orm::entity::prelude::*;
use tenancy_db::ScopableEntity;
use tenancy_security::OrganizationOwned;

/// Unit of measure.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "units")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub organization_id: String,
    pub establishment_id: String,
    pub reference: String,
    pub designation: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl ScopableEntity for Entity {
    fn organization_col() -> Option<Self::Column> {
        Some(Column::OrganizationId)
    }

    fn establishment_col() -> Option<Self::Column> {
        Some(Column::EstablishmentId)
    }
}

impl OrganizationOwned for Model {
    fn organization_id(&self) -> &str {
        &self.organization_id
    }

    fn establishment_id(&self) -> Option<&str> {
        Some(&self.establishment_id)
    }
}
