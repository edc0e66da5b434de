use crate::cli::utils::output_report;
use crate::cli::OutputFormat;
use crate::services::MaintenanceService;

pub async fn cleanup_orphans(
    service: &MaintenanceService,
    folder_root: &str,
    ttl_hours: u32,
    apply: bool,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let report = service.cleanup_orphans(folder_root, ttl_hours, apply).await?;

    let mut summary = format!(
        "{} image(s) scanned, {} referenced, {} orphaned",
        report.scanned,
        report.referenced,
        report.orphans.len()
    );
    if report.applied {
        summary.push_str(&format!(", {} deleted, {} failed", report.deleted, report.failed));
    }

    output_report(&output_format, &summary, &report, &report.orphans, report.applied)
}

pub async fn backfill_public_ids(
    service: &MaintenanceService,
    apply: bool,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let report = service.backfill_public_ids(apply).await?;

    let details: Vec<String> = report
        .changes
        .iter()
        .map(|change| format!("{}: {:?} -> {:?}", change.product_id, change.before, change.after))
        .collect();

    output_report(
        &output_format,
        &format!("{} product(s) scanned, {} need public ids", report.scanned, report.changes.len()),
        &report,
        &details,
        report.applied,
    )
}
