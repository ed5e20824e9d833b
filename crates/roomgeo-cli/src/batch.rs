//! Batch geocoding handler for the CLI.
//!
//! Loads a records file, resolves every eligible record through the shared
//! rate-limited client, and writes the updated records back out. Ctrl-C
//! stops the run before the next record; everything processed so far is
//! still saved.

use std::path::Path;

use roomgeo_core::{load_records, save_records, AppConfig, GeocodingStatus, LocationRecord};
use roomgeo_geocoder::{BatchOptions, BatchProgress, BatchReport, BatchResolver, CancelSignal};

use crate::build_resolver;
use crate::store::MemoryStore;

/// Why a record would be left alone by a batch run, if it would be.
fn skip_reason(record: &LocationRecord, overwrite_manual: bool) -> Option<&'static str> {
    if record.usable_address().is_none() {
        Some("no address")
    } else if record.status == GeocodingStatus::Manual && !overwrite_manual {
        Some("manual")
    } else {
        None
    }
}

/// Resolves every record in `input` and writes the result to `output`.
///
/// When `dry_run` is `true`, prints what would be attempted and returns
/// without contacting the provider or writing anything.
///
/// # Errors
///
/// Returns an error if the records file cannot be read or written, or the
/// geocoder cannot be built from `config`. Per-record failures are reported
/// in the summary, not propagated.
pub(crate) async fn run_batch(
    config: &AppConfig,
    input: &Path,
    output: &Path,
    overwrite_manual: bool,
    dry_run: bool,
) -> anyhow::Result<()> {
    let mut file = load_records(input)?;

    if dry_run {
        print_dry_run(&file.records, overwrite_manual);
        return Ok(());
    }

    let resolver = build_resolver(config)?;
    let store = MemoryStore::for_records(&file.records);
    let batch = BatchResolver::with_options(resolver, store, BatchOptions { overwrite_manual });

    let cancel = CancelSignal::new();
    let listener = tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    println!(
        "Geocoding {} record(s) from {}...",
        file.records.len(),
        input.display()
    );
    let report = batch
        .resolve_batch(&file.records, print_progress, &cancel)
        .await;
    listener.abort();

    let applied = batch.store().apply_to(&mut file.records);
    save_records(output, &file)?;

    print_summary(&report);
    println!("Wrote {applied} update(s) to {}", output.display());

    if report.cancelled {
        anyhow::bail!(
            "batch cancelled after {} of {} record(s)",
            report.outcomes.len(),
            file.records.len()
        );
    }
    Ok(())
}

async fn cancel_on_ctrl_c(cancel: CancelSignal) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::warn!("received ctrl-c, stopping after the current record");
            cancel.cancel();
        }
        Err(e) => tracing::error!(error = %e, "failed to listen for ctrl-c"),
    }
}

fn print_progress(progress: &BatchProgress) {
    let marker = if progress.skipped { "-" } else { "\u{2713}" };
    println!(
        "  [{}/{}] {marker} {}",
        progress.done, progress.total, progress.label
    );
}

fn print_dry_run(records: &[LocationRecord], overwrite_manual: bool) {
    let eligible = records
        .iter()
        .filter(|r| skip_reason(r, overwrite_manual).is_none())
        .count();
    println!(
        "dry-run: would geocode {eligible} of {} record(s):",
        records.len()
    );
    for record in records {
        match skip_reason(record, overwrite_manual) {
            None => println!("  {:<12} {}", record.id, record.label()),
            Some(reason) => println!("  {:<12} skip ({reason})", record.id),
        }
    }
}

fn print_summary(report: &BatchReport) {
    println!(
        "\nGeocoding complete: {} succeeded, {} failed ({} on fallback), {} skipped",
        report.succeeded(),
        report.failed(),
        report.used_fallback(),
        report.skipped()
    );
    for outcome in report.outcomes.iter().filter(|o| !o.success && !o.skipped) {
        let error = outcome.error.as_deref().unwrap_or("unknown error");
        println!("  \u{2717} {:<12} {error}", outcome.record_id);
    }
}
