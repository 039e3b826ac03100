use sea_orm::entity::prelude::*;
use tenancy_db::ScopableEntity;
use tenancy_security::OrganizationOwned;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "establishments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub organization_id: String,
    #[sea_orm(unique)]
    pub reference: String,
    pub designation: String,
    pub currency_id: String,
    pub slogan: Option<String>,
    pub logo: Option<String>,
    pub domain: String,
    pub is_default: bool,
    pub is_hidden: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::OrganizationId",
        to = "super::organization::Column::Id"
    )]
    Organization,
}

impl Related<super::organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ScopableEntity for Entity {
    fn organization_col() -> Option<Self::Column> {
        Some(Column::OrganizationId)
    }

    fn establishment_col() -> Option<Self::Column> {
        Some(Column::Id)
    }
}

impl OrganizationOwned for Model {
    fn organization_id(&self) -> &str {
        &self.organization_id
    }

    fn establishment_id(&self) -> Option<&str> {
        Some(&self.id)
    }
}
