use sqlx::PgPool;

use crate::cli::utils::{output_report, output_success};
use crate::cli::OutputFormat;
use crate::database::DatabaseManager;
use crate::services::MaintenanceService;

pub async fn migrate(pool: &PgPool, output_format: OutputFormat) -> anyhow::Result<()> {
    DatabaseManager::migrate(pool).await?;
    output_success(&output_format, "Migrations applied", None)
}

pub async fn assign_tenants(service: &MaintenanceService, apply: bool, output_format: OutputFormat) -> anyhow::Result<()> {
    let report = service.assign_tenants(apply).await?;

    let total: i64 = report.unassigned.values().sum();
    let target = match (report.tenant_id, report.created_tenant) {
        (Some(id), true) => format!("new default tenant {}", id),
        (Some(id), false) => format!("tenant {}", id),
        (None, _) => "a new default tenant".to_string(),
    };
    let details: Vec<String> = report
        .unassigned
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(table, count)| format!("{}: {} row(s)", table, count))
        .collect();

    output_report(
        &output_format,
        &format!("{} row(s) without a tenant, assigned to {}", total, target),
        &report,
        &details,
        report.applied,
    )
}
