//! Output formatting helpers for human-readable and JSON output.

use fas_client::SyncReport;

use crate::cli::OutputFormat;

/// Print a table with aligned columns in human-readable format.
///
/// `headers` and each row in `rows` must have the same length.
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        return;
    }

    let col_count = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(col_count) {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let header_line: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:<width$}", h, width = widths[i]))
        .collect();
    println!("{}", header_line.join("  ").trim_end());

    for row in rows {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .take(col_count)
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect();
        println!("{}", line.join("  ").trim_end());
    }
}

/// Print the outcome of a sync run.
pub fn print_report(report: &SyncReport, format: OutputFormat) -> Result<(), serde_json::Error> {
    match format {
        OutputFormat::Human => {
            println!("People:      {}", report.people);
            println!("Groups:      {}", report.groups);
            println!("Authorized:  {}", report.authorized);
            println!();

            let mut rows = Vec::new();
            for (label, destination) in &report.install.installed {
                rows.push(vec![
                    label.clone(),
                    "installed".to_string(),
                    destination.display().to_string(),
                ]);
            }
            for (label, err) in &report.install.failures {
                rows.push(vec![label.clone(), "failed".to_string(), err.to_string()]);
            }
            if rows.is_empty() {
                println!("Nothing installed.");
            }
            print_table(&["ARTIFACT", "STATUS", "DETAIL"], &rows);
        }
        OutputFormat::Json => {
            let installed: Vec<_> = report
                .install
                .installed
                .iter()
                .map(|(label, destination)| {
                    serde_json::json!({
                        "artifact": label,
                        "destination": destination.display().to_string(),
                    })
                })
                .collect();
            let failed: Vec<_> = report
                .install
                .failures
                .iter()
                .map(|(label, err)| {
                    serde_json::json!({
                        "artifact": label,
                        "error": err.to_string(),
                    })
                })
                .collect();
            let value = serde_json::json!({
                "people": report.people,
                "groups": report.groups,
                "authorized": report.authorized,
                "installed": installed,
                "failed": failed,
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }
    Ok(())
}
