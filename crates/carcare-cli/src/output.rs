//! Output formatting module

use carcare_app::{Applied, Match};
use carcare_domain::{CustomerRecord, NextService};
use carcare_types::{OutputFormat, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Truncate to `max` characters, marking the cut with "..."
fn truncate_str(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

pub fn output_next(output_format: OutputFormat, next: &NextService) -> Result<()> {
    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(next)?);
    } else {
        println!("Next service date:    {}", next.date.format(DATE_FORMAT));
        println!("Next service mileage: {} km", next.mileage);
    }
    Ok(())
}

pub fn output_applied(output_format: OutputFormat, action: &str, applied: &Applied, record: &CustomerRecord) -> Result<()> {
    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(applied)?);
        return Ok(());
    }

    println!("{} [{}] {} ({})", action, applied.index, record.name, record.plate);
    output_next(output_format, &applied.next_service)?;
    if let Some(sum) = record.total_mismatch() {
        println!("Note: total {} differs from ledger sum {}", record.total_price, sum);
    }
    Ok(())
}

pub fn output_records(output_format: OutputFormat, title: &str, matches: &[Match<'_>], total: usize) -> Result<()> {
    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(matches)?);
        return Ok(());
    }

    println!("{}", title);
    println!("{}", "=".repeat(title.chars().count()));
    println!("Showing {} of {} entries", matches.len(), total);
    println!();

    if matches.is_empty() {
        println!("No entries found.");
        return Ok(());
    }

    println!(
        "{:>4}  {:<12} {:<10} {:<10} {:>10} {:>8} {:>10} {:>8} {:>8}  {}",
        "No.", "Name", "Plate", "Model", "Service", "Km", "Next", "Next km", "Total", "Repairs"
    );
    println!("{}", "-".repeat(110));

    for m in matches {
        let r = m.record;
        println!(
            "{:>4}  {:<12} {:<10} {:<10} {:>10} {:>8} {:>10} {:>8} {:>8}  {}",
            m.index,
            truncate_str(&r.name, 12),
            truncate_str(&r.plate, 10),
            truncate_str(&r.model, 10),
            r.service_date().format(DATE_FORMAT).to_string(),
            r.mileage(),
            r.next_service_date().format(DATE_FORMAT).to_string(),
            r.next_mileage(),
            r.total_price,
            r.repair_ledger
        );
        if !r.phone.is_empty() || !r.note.is_empty() {
            println!("      phone: {}  note: {}", r.phone, r.note);
        }
    }

    Ok(())
}
