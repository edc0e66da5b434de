use uuid::Uuid;

use crate::cli::utils::output_report;
use crate::cli::OutputFormat;
use crate::services::MaintenanceService;

pub async fn remove_merchant(
    service: &MaintenanceService,
    tenant_id: Option<Uuid>,
    user_id: Option<Uuid>,
    apply: bool,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let report = service.remove_merchant(tenant_id, user_id, apply).await?;

    let summary = format!(
        "{} user(s) and {} tenant(s) removed",
        report.users_removed, report.tenants_removed
    );
    output_report(&output_format, &summary, &report, &[], report.applied)
}

pub async fn grant_admin(
    service: &MaintenanceService,
    email: &str,
    apply: bool,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let report = service.grant_admin(email, apply).await?;

    let summary = format!(
        "{} ({}) promoted to ADMIN, was {}",
        report.email, report.user_id, report.previous_role
    );
    output_report(&output_format, &summary, &report, &[], report.applied)
}
