use sea_orm::entity::prelude::*;
use tenancy_db::ScopableEntity;
use tenancy_security::OrganizationOwned;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "organizations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub reference: String,
    pub name: String,
    pub active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::establishment::Entity")]
    Establishment,
}

impl Related<super::establishment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Establishment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// An organization row is owned by itself.
impl ScopableEntity for Entity {
    fn organization_col() -> Option<Self::Column> {
        Some(Column::Id)
    }

    fn establishment_col() -> Option<Self::Column> {
        None
    }
}

impl OrganizationOwned for Model {
    fn organization_id(&self) -> &str {
        &self.id
    }
}
