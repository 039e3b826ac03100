//! Configuration for the tenant-access module.

use std::fmt;
use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::Deserialize;

/// Environment variables with this prefix override file values, `__`
/// separating nested keys (`TENANT_ACCESS__IDENTITY__SECRET`).
pub const ENV_PREFIX: &str = "TENANT_ACCESS__";

/// Module configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TenantAccessConfig {
    /// Connection string, e.g. `sqlite://tenants.db?mode=rwc` or a Postgres DSN.
    pub database_url: String,
    pub max_connections: u32,
    pub identity: IdentityConfig,
    pub provisioning: ProvisioningConfig,
}

impl Default for TenantAccessConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_owned(),
            max_connections: 10,
            identity: IdentityConfig::default(),
            provisioning: ProvisioningConfig::default(),
        }
    }
}

impl TenantAccessConfig {
    /// Defaults, then the YAML file (when given and present), then environment.
    ///
    /// # Errors
    /// Returns `ConfigError` if a source cannot be parsed or has unknown keys.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| ConfigError::Invalid(Box::new(e)))
    }
}

/// Session token verification settings.
#[derive(Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentityConfig {
    /// HS256 shared secret used to sign session tokens.
    pub secret: String,
    /// Expected `iss` claim, if any.
    pub issuer: Option<String>,
    pub leeway_seconds: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            issuer: None,
            leeway_seconds: 60,
        }
    }
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

/// Naming of provisioned organizations and establishments.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProvisioningConfig {
    pub organization_id_prefix: String,
    pub establishment_id_prefix: String,
    pub organization_reference_prefix: String,
    pub establishment_reference_prefix: String,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            organization_id_prefix: "org".to_owned(),
            establishment_id_prefix: "etb".to_owned(),
            organization_reference_prefix: "ORG-".to_owned(),
            establishment_reference_prefix: "ETB-".to_owned(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(#[source] Box<figment::Error>),

    #[error("identity.secret must be set to verify session tokens")]
    MissingSecret,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_apply_without_sources() {
        let config: TenantAccessConfig = Figment::new().extract().unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.provisioning.organization_id_prefix, "org");
        assert_eq!(config.provisioning.establishment_reference_prefix, "ETB-");
        assert_eq!(config.identity.leeway_seconds, 60);
    }

    #[test]
    fn yaml_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "database_url: \"sqlite://tenants.db?mode=rwc\"\nidentity:\n  secret: s3cr3t\n  issuer: auth.example\nprovisioning:\n  organization_id_prefix: tenant"
        )
        .unwrap();

        let config = TenantAccessConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.database_url, "sqlite://tenants.db?mode=rwc");
        assert_eq!(config.identity.secret, "s3cr3t");
        assert_eq!(config.identity.issuer.as_deref(), Some("auth.example"));
        assert_eq!(config.provisioning.organization_id_prefix, "tenant");
        assert_eq!(config.provisioning.establishment_id_prefix, "etb");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "database_urll: \"sqlite::memory:\"").unwrap();

        let err = TenantAccessConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    #[allow(clippy::use_debug)]
    fn debug_output_hides_the_secret() {
        let identity = IdentityConfig {
            secret: "s3cr3t".to_owned(),
            ..IdentityConfig::default()
        };
        let rendered = format!("{identity:?}");
        assert!(!rendered.contains("s3cr3t"));
    }
}
