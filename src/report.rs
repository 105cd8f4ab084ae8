//! Result output (CSV export and console table)

use csv::Writer;
use std::path::Path;

use crate::engine::{DerivedRecord, Trend};
use crate::error::Result;

/// Column layout derived from the records being written
///
/// The set column only appears when at least one record carries a set, and
/// the trend columns only when trends were computed (they are all-or-nothing
/// per evaluation).
struct Layout {
    with_sets: bool,
    with_trends: bool,
}

impl Layout {
    fn of(records: &[DerivedRecord]) -> Self {
        Self {
            with_sets: records.iter().any(|r| r.set_name.is_some()),
            with_trends: records.iter().any(|r| r.raw_trend.is_some()),
        }
    }
}

/// Export filtered results to a CSV file
pub fn write_csv(path: &Path, records: &[DerivedRecord], grading_fee: f64) -> Result<()> {
    let layout = Layout::of(records);
    let mut wtr = Writer::from_path(path)?;

    let mut header: Vec<&str> = Vec::new();
    if layout.with_sets {
        header.push("Set Name");
    }
    header.push("Card Name");
    header.push("Raw Price");
    if layout.with_trends {
        header.push("Raw Trend");
    }
    header.push("PSA 10 Price");
    if layout.with_trends {
        header.push("PSA 10 Trend");
    }
    header.extend(["Grading Fee", "Total Cost", "Profit Margin"]);
    wtr.write_record(&header)?;

    for record in records {
        let mut row: Vec<String> = Vec::new();
        if layout.with_sets {
            row.push(record.set_name.clone().unwrap_or_default());
        }
        row.push(record.name.clone());
        row.push(format!("{:.2}", record.raw_price));
        if layout.with_trends {
            row.push(trend_cell(record.raw_trend));
        }
        row.push(format!("{:.2}", record.graded_price));
        if layout.with_trends {
            row.push(trend_cell(record.graded_trend));
        }
        row.push(format!("{:.2}", grading_fee));
        row.push(format!("{:.2}", record.total_cost));
        row.push(format!("{:.2}", record.profit_margin));
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

fn trend_cell(trend: Option<Trend>) -> String {
    trend.map(|t| t.to_string()).unwrap_or_default()
}

/// Print the filtered results as a console table
pub fn print_results(records: &[DerivedRecord], grading_fee: f64) {
    println!("Found {} cards matching filters (fee ${:.2}):", records.len(), grading_fee);
    if records.is_empty() {
        return;
    }

    let layout = Layout::of(records);

    if layout.with_trends {
        println!(
            "{:<28} {:<16} {:>10} {:>6} {:>12} {:>6} {:>11} {:>14}",
            "Card", "Set", "Raw", "", "PSA 10", "", "Total Cost", "Profit Margin"
        );
        println!("{}", "-".repeat(110));
        for r in records {
            println!(
                "{:<28} {:<16} {:>10.2} {:>6} {:>12.2} {:>6} {:>11.2} {:>14.2}",
                truncate(&r.name, 27),
                truncate(r.set_name.as_deref().unwrap_or("-"), 15),
                r.raw_price,
                trend_cell(r.raw_trend),
                r.graded_price,
                trend_cell(r.graded_trend),
                r.total_cost,
                r.profit_margin,
            );
        }
        println!("{}", "-".repeat(110));
    } else {
        println!(
            "{:<28} {:<16} {:>10} {:>12} {:>11} {:>14}",
            "Card", "Set", "Raw", "PSA 10", "Total Cost", "Profit Margin"
        );
        println!("{}", "-".repeat(95));
        for r in records {
            println!(
                "{:<28} {:<16} {:>10.2} {:>12.2} {:>11.2} {:>14.2}",
                truncate(&r.name, 27),
                truncate(r.set_name.as_deref().unwrap_or("-"), 15),
                r.raw_price,
                r.graded_price,
                r.total_cost,
                r.profit_margin,
            );
        }
        println!("{}", "-".repeat(95));
    }
}

/// Truncate string for display
fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}
