//! CLI definition using clap

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use carcare_types::OutputFormat;

#[derive(Parser)]
#[command(name = "carcare")]
#[command(version)]
#[command(about = "Customer, vehicle and service records for a repair shop")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Customer data file. Uses config value if not specified.
    #[arg(long, global = true)]
    pub file: Option<PathBuf>,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a customer entry
    Add {
        /// Customer name
        #[arg(long)]
        name: String,

        /// License plate (e.g., "ABC-123")
        #[arg(long)]
        plate: String,

        #[arg(long, default_value = "")]
        phone: String,

        /// Vehicle model
        #[arg(long, default_value = "")]
        model: String,

        /// Service date (YYYY-MM-DD). Defaults to today.
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,

        /// Odometer reading at this service
        #[arg(long, default_value_t = 0)]
        mileage: u64,

        /// Repair item as ITEM=PRICE (repeatable, e.g., --item "換油=500")
        #[arg(long = "item", value_parser = parse_repair_item)]
        items: Vec<(String, u64)>,

        #[arg(long, default_value = "")]
        note: String,
    },

    /// Edit the entry at a position; omitted fields keep their current values
    Edit {
        /// Position shown by `list`
        index: usize,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        plate: Option<String>,

        #[arg(long)]
        model: Option<String>,

        /// Service date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,

        #[arg(long)]
        mileage: Option<u64>,

        /// Repair ledger text, e.g. "換油 ($500), 輪胎 ($3200)"
        #[arg(long)]
        ledger: Option<String>,

        /// Total price (kept as given, even if it differs from the ledger)
        #[arg(long)]
        total: Option<u64>,

        #[arg(long)]
        note: Option<String>,
    },

    /// Delete the entry at a position
    Delete {
        /// Position shown by `list`
        index: usize,
    },

    /// List all entries
    List,

    /// Search name, plate and repair items
    Search {
        /// Keyword (case-insensitive)
        keyword: String,
    },

    /// Show when the next service is due
    Next {
        /// Service date (YYYY-MM-DD). Defaults to today.
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,

        #[arg(long, default_value_t = 0)]
        mileage: u64,
    },

    /// Export entries to Excel
    Export {
        /// Output Excel file path
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Only export entries matching this keyword
        #[arg(long, short = 'k')]
        keyword: Option<String>,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set customer data file
        #[arg(long)]
        set_data_file: Option<PathBuf>,

        /// Set load cache freshness window in seconds
        #[arg(long)]
        set_cache_ttl: Option<u64>,

        /// Set default output format
        #[arg(long)]
        set_output: Option<OutputFormat>,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

fn parse_repair_item(s: &str) -> Result<(String, u64), String> {
    let (item, price) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected ITEM=PRICE, got {:?}", s))?;
    let price = price
        .trim()
        .parse::<u64>()
        .map_err(|e| format!("invalid price {:?}: {}", price, e))?;
    Ok((item.trim().to_string(), price))
}
