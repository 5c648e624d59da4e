//! Headless mode dispatch
//!
//! Every headless command drives the same [`Console`] the TUI uses: start
//! the operation, apply events until it settles, print the outcome.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use crate::backend::Backend;
use crate::cli::{Mode, Result, EXIT_FAILURE, EXIT_SUCCESS};
use crate::console::Console;
use crate::model::{QueryTarget, TestStatus, TransferStatus};
use crate::ui::present::{self, ResultDisplay};

/// Exit code wrapper for CLI operations
pub type ExitCode = i32;

/// Run one headless command and return its exit code
pub async fn run_cli_mode<W: Write>(
    mode: Mode,
    console: &mut Console,
    backend: Arc<dyn Backend>,
    out: &mut W,
) -> Result<ExitCode> {
    match mode {
        Mode::Tui => Ok(EXIT_SUCCESS),
        Mode::Test => run_test(console, out).await,
        Mode::Transfer { detach } => run_transfer(console, detach, out).await,
        Mode::Status => run_status(backend.as_ref(), out).await,
        Mode::Audit { verify } => run_audit(console, verify, out).await,
        Mode::Query { target, sql } => run_query(console, target, sql, out).await,
        Mode::Report { output } => run_report(console, output, out).await,
    }
}

async fn run_test<W: Write>(console: &mut Console, out: &mut W) -> Result<ExitCode> {
    console.test_connection();
    console
        .run_until(|c| {
            c.tester()
                .result()
                .map_or(true, |r| r.status != TestStatus::Testing)
        })
        .await;

    let Some(result) = console.tester().result() else {
        return Ok(EXIT_FAILURE);
    };
    let label = match result.status {
        TestStatus::Success => "OK",
        TestStatus::Error => "ERROR",
        TestStatus::Testing => "TESTING",
    };
    writeln!(out, "{}: {}", label, result.message)?;
    Ok(if result.is_success() {
        EXIT_SUCCESS
    } else {
        EXIT_FAILURE
    })
}

async fn run_transfer<W: Write>(
    console: &mut Console,
    detach: bool,
    out: &mut W,
) -> Result<ExitCode> {
    console.start_transfer()?;
    console.run_until(|c| !c.transfer().is_submitting()).await;

    if !console.transfer().is_polling() {
        // Submission was rejected; the console recorded why
        if let Some(notice) = console.latest_notice() {
            writeln!(out, "{}", notice.text)?;
        }
        return Ok(EXIT_FAILURE);
    }
    writeln!(out, "Transfer accepted")?;
    if detach {
        return Ok(EXIT_SUCCESS);
    }

    let mut printed = 0;
    while console.transfer().is_polling() {
        match console.next_event().await {
            Some(event) => console.apply(event),
            None => break,
        }
        if let Some(progress) = console.transfer().progress() {
            if progress.logs.len() < printed {
                printed = 0;
            }
            for line in &progress.logs[printed..] {
                writeln!(out, "  {}", line)?;
            }
            printed = progress.logs.len();
        }
    }

    let transfer = console.transfer();
    match transfer.status() {
        Some(TransferStatus::Completed) => {
            let Some(summary) = present::transfer_summary(transfer.progress()) else {
                writeln!(out, "Transfer completed without an integrity result")?;
                return Ok(EXIT_FAILURE);
            };
            writeln!(out, "Hash before: {}", summary.hash_before)?;
            writeln!(out, "Hash after:  {}", summary.hash_after)?;
            if summary.integrity_passed {
                writeln!(out, "Integrity check passed")?;
                Ok(EXIT_SUCCESS)
            } else {
                writeln!(out, "Integrity check FAILED")?;
                Ok(EXIT_FAILURE)
            }
        }
        Some(TransferStatus::Failed) => {
            let step = transfer
                .progress()
                .map(|p| p.current_step.as_str())
                .unwrap_or_default();
            writeln!(out, "Transfer failed: {}", step)?;
            Ok(EXIT_FAILURE)
        }
        _ => {
            let reason = transfer
                .last_stop()
                .map(|r| r.describe())
                .unwrap_or_else(|| "unknown".to_string());
            writeln!(out, "Stopped following the transfer: {}", reason)?;
            Ok(EXIT_FAILURE)
        }
    }
}

async fn run_status<W: Write>(backend: &dyn Backend, out: &mut W) -> Result<ExitCode> {
    let progress = backend.progress().await?;
    writeln!(out, "Status: {}", progress.status.display_name())?;
    writeln!(out, "Step:   {}", progress.current_step)?;
    if let Some(summary) = present::transfer_summary(Some(&progress)) {
        writeln!(out, "Hash before: {}", summary.hash_before)?;
        writeln!(out, "Hash after:  {}", summary.hash_after)?;
        writeln!(
            out,
            "Integrity: {}",
            if summary.integrity_passed {
                "passed"
            } else {
                "FAILED"
            }
        )?;
    }
    Ok(EXIT_SUCCESS)
}

async fn run_audit<W: Write>(console: &mut Console, verify: bool, out: &mut W) -> Result<ExitCode> {
    console.refresh_audit();
    console.run_until(|c| !c.audit().is_loading()).await;

    let audit = console.audit();
    if let Some(err) = audit.last_error() {
        writeln!(out, "Audit trail unavailable: {}", err)?;
        return Ok(EXIT_FAILURE);
    }
    if audit.entries().is_empty() {
        writeln!(out, "No audit entries.")?;
    }
    for entry in audit.entries() {
        let row = present::audit_row(entry);
        writeln!(
            out,
            "{}  {:<6} {}  prev {}",
            row.timestamp, row.status, row.current_hash, row.previous_hash
        )?;
    }

    if !verify {
        return Ok(EXIT_SUCCESS);
    }
    let Some(report) = audit.chain() else {
        return Ok(EXIT_FAILURE);
    };
    writeln!(out, "{}", report.summary())?;
    for finding in &report.findings {
        writeln!(out, "  - {}", finding.describe())?;
    }
    Ok(if report.is_intact() {
        EXIT_SUCCESS
    } else {
        EXIT_FAILURE
    })
}

async fn run_query<W: Write>(
    console: &mut Console,
    target: QueryTarget,
    sql: String,
    out: &mut W,
) -> Result<ExitCode> {
    let query = console.query_mut();
    query.set_target(target);
    query.set_query(sql);
    console.execute_query()?;
    console.run_until(|c| !c.query().is_loading()).await;

    let Some(outcome) = console.query().outcome() else {
        return Ok(EXIT_FAILURE);
    };
    match present::present_outcome(outcome) {
        ResultDisplay::Error(message) => {
            writeln!(out, "Error: {}", message)?;
            Ok(EXIT_FAILURE)
        }
        ResultDisplay::NoRecords => {
            writeln!(out, "{}", present::NO_RECORDS)?;
            Ok(EXIT_SUCCESS)
        }
        ResultDisplay::Table { header, rows } => {
            write_table(out, &header, &rows)?;
            Ok(EXIT_SUCCESS)
        }
        ResultDisplay::Structured(text) => {
            writeln!(out, "{}", text)?;
            Ok(EXIT_SUCCESS)
        }
    }
}

async fn run_report<W: Write>(
    console: &mut Console,
    output: Option<PathBuf>,
    out: &mut W,
) -> Result<ExitCode> {
    console.download_report(output)?;
    console.run_until(|c| !c.report().is_downloading()).await;

    let Some(notice) = console.latest_notice() else {
        return Ok(EXIT_FAILURE);
    };
    writeln!(out, "{}", notice.text)?;
    Ok(if notice.level == crate::console::NoticeLevel::Info {
        EXIT_SUCCESS
    } else {
        EXIT_FAILURE
    })
}

/// Plain-text table with padded columns
pub fn write_table<W: Write>(
    out: &mut W,
    header: &[String],
    rows: &[Vec<String>],
) -> std::io::Result<()> {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };
    writeln!(out, "{}", line(header))?;
    writeln!(
        out,
        "{}",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-")
    )?;
    for row in rows {
        writeln!(out, "{}", line(row))?;
    }
    Ok(())
}
