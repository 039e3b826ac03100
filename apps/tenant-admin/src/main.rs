#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tenant_access::TenantAccessConfig;
use tenant_access::TenantAccessModule;
use tenant_access::domain::NanoIdGenerator;
use tenant_access::infra::jwt::JwtIdentityVerifier;
use tenant_access_sdk::{
    AccessDecision, NewTenant, OrganizationId, PrincipalId, Role, Scope, TenantAccessClient,
};
use tracing_subscriber::EnvFilter;

/// Tenant Admin - manage tenants and memberships of the tenant-access store
#[derive(Parser)]
#[command(name = "tenant-admin")]
#[command(about = "Tenant Admin - manage tenants and memberships")]
#[command(version)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,

    /// Log verbosity level (default info, -v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending migrations and exit
    Migrate,
    /// Verify a session token and upsert its principal
    Resolve {
        /// Raw token or `Bearer <token>`
        token: String,
    },
    /// Create an organization with its default establishment for a principal
    Provision {
        #[arg(long)]
        principal: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        currency: String,
        #[arg(long)]
        slogan: Option<String>,
        #[arg(long)]
        logo: Option<String>,
    },
    /// Link a principal to an organization (existing links are kept as is)
    Link {
        #[arg(long)]
        principal: String,
        #[arg(long)]
        organization: String,
        /// SUPER_ADMIN, MANAGER or USER
        #[arg(long, default_value = "USER")]
        role: Role,
    },
    /// Remove a principal's membership
    Unlink {
        #[arg(long)]
        principal: String,
        #[arg(long)]
        organization: String,
    },
    /// Change the role of an existing membership
    SetRole {
        #[arg(long)]
        principal: String,
        #[arg(long)]
        organization: String,
        #[arg(long)]
        role: Role,
    },
    /// List the organizations and establishments a principal can access
    Orgs {
        #[arg(long)]
        principal: String,
    },
    /// Evaluate access of a principal to an organization or establishment
    Decide {
        #[arg(long)]
        principal: Option<String>,
        #[arg(long)]
        organization: String,
        #[arg(long)]
        establishment: Option<String>,
    },
}

#[derive(Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
enum DecisionView {
    Allowed {
        role: Role,
        organization_id: OrganizationId,
    },
    Denied {
        reason: &'static str,
    },
}

impl From<AccessDecision> for DecisionView {
    fn from(decision: AccessDecision) -> Self {
        match decision {
            AccessDecision::Allowed(granted) => Self::Allowed {
                role: granted.role(),
                organization_id: granted.organization_id().clone(),
            },
            AccessDecision::Denied(reason) => Self::Denied {
                reason: reason.as_str(),
            },
        }
    }
}

/// `info` by default, each `-v` one level chattier.
fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{rendered}");
    Ok(())
}

async fn open(config: &TenantAccessConfig, verify_tokens: bool) -> Result<TenantAccessModule> {
    if verify_tokens {
        return TenantAccessModule::init(config).await;
    }
    // Commands that never see a token still need a verifier to wire the module.
    let verifier = JwtIdentityVerifier::hs256(
        config.identity.secret.as_bytes(),
        config.identity.issuer.as_deref(),
        config.identity.leeway_seconds,
    );
    TenantAccessModule::init_with(config, Arc::new(verifier), Arc::new(NanoIdGenerator)).await
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(path) = cli.config.as_deref()
        && !path.is_file()
    {
        anyhow::bail!("config file does not exist: {}", path.display());
    }
    let mut config = TenantAccessConfig::load(cli.config.as_deref())?;
    if let Some(url) = cli.database_url {
        config.database_url = url;
    }

    let verify_tokens = matches!(cli.command, Commands::Resolve { .. });
    let module = open(&config, verify_tokens).await?;
    let service = module.service();

    match cli.command {
        Commands::Migrate => {
            tracing::info!(engine = module.db().db_engine(), "migrations applied");
        }
        Commands::Resolve { token } => {
            let principal = module.client().resolve_principal(Some(&token)).await?;
            print_json(&principal)?;
        }
        Commands::Provision {
            principal,
            name,
            currency,
            slogan,
            logo,
        } => {
            let request = NewTenant::new(name, currency).with_branding(slogan, logo);
            let tenant = module
                .client()
                .provision(&PrincipalId::new(principal), request)
                .await?;
            print_json(&tenant)?;
        }
        Commands::Link {
            principal,
            organization,
            role,
        } => {
            let membership = service
                .link(
                    &PrincipalId::new(principal),
                    &OrganizationId::new(organization),
                    role,
                )
                .await?;
            print_json(&membership)?;
        }
        Commands::Unlink {
            principal,
            organization,
        } => {
            let removed = service
                .unlink(
                    &PrincipalId::new(principal),
                    &OrganizationId::new(organization),
                )
                .await?;
            print_json(&serde_json::json!({ "removed": removed }))?;
        }
        Commands::SetRole {
            principal,
            organization,
            role,
        } => {
            let membership = service
                .set_role(
                    &PrincipalId::new(principal),
                    &OrganizationId::new(organization),
                    role,
                )
                .await?;
            print_json(&membership)?;
        }
        Commands::Orgs { principal } => {
            let access = module
                .client()
                .organizations_and_establishments_of(&PrincipalId::new(principal))
                .await?;
            print_json(&access)?;
        }
        Commands::Decide {
            principal,
            organization,
            establishment,
        } => {
            let principal = principal.map(PrincipalId::new);
            let scope = match establishment {
                Some(establishment) => Scope::establishment(organization, establishment),
                None => Scope::organization(organization),
            };
            let decision = module.client().decide(principal.as_ref(), &scope).await?;
            print_json(&DecisionView::from(decision))?;
        }
    }

    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_the_default_level() {
        assert_eq!(default_level(0), "info");
        assert_eq!(default_level(1), "debug");
        assert_eq!(default_level(2), "trace");
        assert_eq!(default_level(7), "trace");
    }

    #[test]
    fn cli_parses_repeated_verbose_flags() {
        let cli = Cli::try_parse_from(["tenant-admin", "-vv", "migrate"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Migrate));
    }
}
