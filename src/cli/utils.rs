use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output a maintenance report: the whole report under `report` for JSON,
/// the summary line plus `details` for text
pub fn output_report<T: Serialize>(
    output_format: &OutputFormat,
    summary: &str,
    report: &T,
    details: &[String],
    applied: bool,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => output_success(output_format, summary, Some(json!({ "report": report }))),
        OutputFormat::Text => {
            let mode = if applied { "applied" } else { "dry run" };
            println!("✓ {} ({})", summary, mode);
            for line in details {
                println!("  {}", line);
            }
            if !applied {
                println!("Re-run with --apply to make these changes");
            }
            Ok(())
        }
    }
}
