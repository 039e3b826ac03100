use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let conn = manager.get_connection();

        let sql = match backend {
            sea_orm::DatabaseBackend::Postgres => {
                r"
CREATE TABLE IF NOT EXISTS principals (
    subject VARCHAR(255) PRIMARY KEY NOT NULL,
    email VARCHAR(255),
    first_name VARCHAR(255),
    last_name VARCHAR(255),
    picture TEXT,
    created_at TIMESTAMPTZ NOT NULL,
    last_login_at TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS organizations (
    id VARCHAR(255) PRIMARY KEY NOT NULL,
    reference VARCHAR(255) NOT NULL,
    name VARCHAR(255) NOT NULL,
    active BOOLEAN NOT NULL,
    created_at TIMESTAMPTZ NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS uk_organizations_reference ON organizations(reference);

CREATE TABLE IF NOT EXISTS establishments (
    id VARCHAR(255) PRIMARY KEY NOT NULL,
    organization_id VARCHAR(255) NOT NULL,
    reference VARCHAR(255) NOT NULL,
    designation VARCHAR(255) NOT NULL,
    currency_id VARCHAR(16) NOT NULL,
    slogan TEXT,
    logo TEXT,
    domain VARCHAR(64) NOT NULL,
    is_default BOOLEAN NOT NULL,
    is_hidden BOOLEAN NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT uk_establishments_org_id UNIQUE (organization_id, id),
    CONSTRAINT fk_establishments_organization FOREIGN KEY (organization_id) REFERENCES organizations(id) ON DELETE RESTRICT
);

CREATE UNIQUE INDEX IF NOT EXISTS uk_establishments_reference ON establishments(reference);
CREATE INDEX IF NOT EXISTS idx_establishments_organization ON establishments(organization_id);
CREATE UNIQUE INDEX IF NOT EXISTS uk_establishments_default ON establishments(organization_id) WHERE is_default;

CREATE TABLE IF NOT EXISTS memberships (
    id BIGSERIAL PRIMARY KEY,
    principal_id VARCHAR(255) NOT NULL,
    organization_id VARCHAR(255) NOT NULL,
    role VARCHAR(32) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT fk_memberships_organization FOREIGN KEY (organization_id) REFERENCES organizations(id) ON DELETE RESTRICT
);

CREATE UNIQUE INDEX IF NOT EXISTS uk_memberships_principal_org ON memberships(principal_id, organization_id);
CREATE INDEX IF NOT EXISTS idx_memberships_organization ON memberships(organization_id);

CREATE TABLE IF NOT EXISTS deposits (
    id VARCHAR(255) PRIMARY KEY NOT NULL,
    organization_id VARCHAR(255) NOT NULL,
    establishment_id VARCHAR(255) NOT NULL,
    reference VARCHAR(255) NOT NULL,
    designation VARCHAR(255) NOT NULL,
    deposit_type VARCHAR(32) NOT NULL,
    is_default BOOLEAN NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT fk_deposits_organization FOREIGN KEY (organization_id) REFERENCES organizations(id) ON DELETE RESTRICT,
    CONSTRAINT fk_deposits_establishment FOREIGN KEY (organization_id, establishment_id) REFERENCES establishments(organization_id, id) ON DELETE RESTRICT
);

CREATE INDEX IF NOT EXISTS idx_deposits_org_etb ON deposits(organization_id, establishment_id);

CREATE TABLE IF NOT EXISTS units (
    id VARCHAR(255) PRIMARY KEY NOT NULL,
    organization_id VARCHAR(255) NOT NULL,
    establishment_id VARCHAR(255) NOT NULL,
    reference VARCHAR(255) NOT NULL,
    designation VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT fk_units_organization FOREIGN KEY (organization_id) REFERENCES organizations(id) ON DELETE RESTRICT,
    CONSTRAINT fk_units_establishment FOREIGN KEY (organization_id, establishment_id) REFERENCES establishments(organization_id, id) ON DELETE RESTRICT
);

CREATE INDEX IF NOT EXISTS idx_units_org_etb ON units(organization_id, establishment_id);
                "
            }
            sea_orm::DatabaseBackend::Sqlite => {
                r"
CREATE TABLE IF NOT EXISTS principals (
    subject TEXT PRIMARY KEY NOT NULL,
    email TEXT,
    first_name TEXT,
    last_name TEXT,
    picture TEXT,
    created_at TEXT NOT NULL,
    last_login_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS organizations (
    id TEXT PRIMARY KEY NOT NULL,
    reference TEXT NOT NULL,
    name TEXT NOT NULL,
    active INTEGER NOT NULL,
    created_at TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS uk_organizations_reference ON organizations(reference);

CREATE TABLE IF NOT EXISTS establishments (
    id TEXT PRIMARY KEY NOT NULL,
    organization_id TEXT NOT NULL,
    reference TEXT NOT NULL,
    designation TEXT NOT NULL,
    currency_id TEXT NOT NULL,
    slogan TEXT,
    logo TEXT,
    domain TEXT NOT NULL,
    is_default INTEGER NOT NULL,
    is_hidden INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE (organization_id, id),
    FOREIGN KEY (organization_id) REFERENCES organizations(id) ON DELETE RESTRICT
);

CREATE UNIQUE INDEX IF NOT EXISTS uk_establishments_reference ON establishments(reference);
CREATE INDEX IF NOT EXISTS idx_establishments_organization ON establishments(organization_id);
CREATE UNIQUE INDEX IF NOT EXISTS uk_establishments_default ON establishments(organization_id) WHERE is_default = 1;

CREATE TABLE IF NOT EXISTS memberships (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    principal_id TEXT NOT NULL,
    organization_id TEXT NOT NULL,
    role TEXT NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY (organization_id) REFERENCES organizations(id) ON DELETE RESTRICT
);

CREATE UNIQUE INDEX IF NOT EXISTS uk_memberships_principal_org ON memberships(principal_id, organization_id);
CREATE INDEX IF NOT EXISTS idx_memberships_organization ON memberships(organization_id);

CREATE TABLE IF NOT EXISTS deposits (
    id TEXT PRIMARY KEY NOT NULL,
    organization_id TEXT NOT NULL,
    establishment_id TEXT NOT NULL,
    reference TEXT NOT NULL,
    designation TEXT NOT NULL,
    deposit_type TEXT NOT NULL,
    is_default INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY (organization_id) REFERENCES organizations(id) ON DELETE RESTRICT,
    FOREIGN KEY (organization_id, establishment_id) REFERENCES establishments(organization_id, id) ON DELETE RESTRICT
);

CREATE INDEX IF NOT EXISTS idx_deposits_org_etb ON deposits(organization_id, establishment_id);

CREATE TABLE IF NOT EXISTS units (
    id TEXT PRIMARY KEY NOT NULL,
    organization_id TEXT NOT NULL,
    establishment_id TEXT NOT NULL,
    reference TEXT NOT NULL,
    designation TEXT NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY (organization_id) REFERENCES organizations(id) ON DELETE RESTRICT,
    FOREIGN KEY (organization_id, establishment_id) REFERENCES establishments(organization_id, id) ON DELETE RESTRICT
);

CREATE INDEX IF NOT EXISTS idx_units_org_etb ON units(organization_id, establishment_id);
                "
            }
            sea_orm::DatabaseBackend::MySql => {
                return Err(DbErr::Migration(
                    "tenant-access does not support MySQL".to_owned(),
                ));
            }
        };

        conn.execute_unprepared(sql).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        let sql = r"
DROP TABLE IF EXISTS units;
DROP TABLE IF EXISTS deposits;
DROP TABLE IF EXISTS memberships;
DROP TABLE IF EXISTS establishments;
DROP TABLE IF EXISTS organizations;
DROP TABLE IF EXISTS principals;
        ";
        conn.execute_unprepared(sql).await?;
        Ok(())
    }
}
