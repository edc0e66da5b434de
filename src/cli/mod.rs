pub mod commands;
pub mod utils;

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;
use crate::database::DatabaseManager;
use crate::media::CloudinaryStore;
use crate::services::maintenance_service::MAX_TTL_HOURS;
use crate::services::MaintenanceService;

#[derive(Parser)]
#[command(name = "storeflex")]
#[command(about = "Storeflex maintenance CLI - database and media host repairs")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Shared by every mutating command; without it nothing is written
#[derive(Args, Debug, Clone, Copy)]
pub struct ApplyFlag {
    #[arg(long, help = "Perform the changes instead of a dry run")]
    pub apply: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply pending SQL migrations")]
    Migrate,

    #[command(about = "Delete media host images no product references")]
    CleanupOrphans {
        #[arg(
            long,
            default_value_t = 24,
            value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_TTL_HOURS)),
            help = "Only images at least this many hours old"
        )]
        ttl_hours: u32,
        #[command(flatten)]
        apply: ApplyFlag,
    },

    #[command(about = "Fill missing or misaligned image public ids from the image URLs")]
    BackfillPublicIds {
        #[command(flatten)]
        apply: ApplyFlag,
    },

    #[command(about = "Attach rows without a tenant to the default tenant")]
    AssignTenants {
        #[command(flatten)]
        apply: ApplyFlag,
    },

    #[command(about = "Remove a merchant user and/or a whole store")]
    RemoveMerchant {
        #[arg(long, help = "Tenant to delete with its catalog")]
        tenant_id: Option<Uuid>,
        #[arg(long, help = "User to delete")]
        user_id: Option<Uuid>,
        #[command(flatten)]
        apply: ApplyFlag,
    },

    #[command(about = "Give a user the ADMIN role")]
    GrantAdmin {
        #[arg(long, help = "Email of the user")]
        email: String,
        #[command(flatten)]
        apply: ApplyFlag,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = config::config();

    let pool = DatabaseManager::connect(&config.database).await?;
    let maintenance = || -> anyhow::Result<MaintenanceService> {
        let media = CloudinaryStore::from_config(&config.media)?;
        Ok(MaintenanceService::new(pool.clone(), Arc::new(media)))
    };

    match cli.command {
        Commands::Migrate => commands::database::migrate(&pool, output_format).await,
        Commands::CleanupOrphans { ttl_hours, apply } => {
            commands::media::cleanup_orphans(
                &maintenance()?,
                &config.media.folder_root,
                ttl_hours,
                apply.apply,
                output_format,
            )
            .await
        }
        Commands::BackfillPublicIds { apply } => {
            commands::media::backfill_public_ids(&maintenance()?, apply.apply, output_format).await
        }
        Commands::AssignTenants { apply } => {
            commands::database::assign_tenants(&maintenance()?, apply.apply, output_format).await
        }
        Commands::RemoveMerchant { tenant_id, user_id, apply } => {
            commands::accounts::remove_merchant(&maintenance()?, tenant_id, user_id, apply.apply, output_format).await
        }
        Commands::GrantAdmin { email, apply } => {
            commands::accounts::grant_admin(&maintenance()?, &email, apply.apply, output_format).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_default_to_dry_run() {
        let cli = Cli::try_parse_from(["storeflex", "cleanup-orphans"]).unwrap();
        match cli.command {
            Commands::CleanupOrphans { ttl_hours, apply } => {
                assert_eq!(ttl_hours, 24);
                assert!(!apply.apply);
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn orphan_age_must_be_in_range() {
        assert!(Cli::try_parse_from(["storeflex", "cleanup-orphans", "--ttl-hours", "-1"]).is_err());
        assert!(Cli::try_parse_from(["storeflex", "cleanup-orphans", "--ttl-hours", "87601"]).is_err());
        let cli = Cli::try_parse_from(["storeflex", "cleanup-orphans", "--ttl-hours", "0"]).unwrap();
        assert!(matches!(cli.command, Commands::CleanupOrphans { ttl_hours: 0, .. }));
    }

    #[test]
    fn global_json_flag_and_apply_parse() {
        let cli = Cli::try_parse_from(["storeflex", "grant-admin", "--email", "a@b.test", "--apply", "--json"]).unwrap();
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
        match cli.command {
            Commands::GrantAdmin { email, apply } => {
                assert_eq!(email, "a@b.test");
                assert!(apply.apply);
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn remove_merchant_takes_uuids() {
        let id = Uuid::new_v4().to_string();
        let cli = Cli::try_parse_from(["storeflex", "remove-merchant", "--tenant-id", &id]).unwrap();
        assert!(matches!(cli.command, Commands::RemoveMerchant { tenant_id: Some(_), user_id: None, .. }));
        assert!(Cli::try_parse_from(["storeflex", "remove-merchant", "--user-id", "nope"]).is_err());
    }
}
