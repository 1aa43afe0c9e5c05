//! Command handlers

use std::path::PathBuf;

use chrono::{Local, NaiveDate};

use carcare_app::config::Config;
use carcare_app::export::export_to_excel;
use carcare_app::repository::{self, FileRepository};
use carcare_app::{CustomerBook, CustomerEdit, NewCustomer};
use carcare_domain::{compute_next, filter_records, CustomerRecord};
use carcare_types::{OutputFormat, Result, StoreError};

use crate::cli::{Cli, Commands};
use crate::output::{output_applied, output_next, output_records};

/// Fields of `carcare edit`; `None` keeps the current value
struct EditArgs {
    name: Option<String>,
    phone: Option<String>,
    plate: Option<String>,
    model: Option<String>,
    date: Option<NaiveDate>,
    mileage: Option<u64>,
    ledger: Option<String>,
    total: Option<u64>,
    note: Option<String>,
}

impl EditArgs {
    fn apply(self, edit: &mut CustomerEdit) {
        if let Some(name) = self.name {
            edit.name = name;
        }
        if let Some(phone) = self.phone {
            edit.phone = phone;
        }
        if let Some(plate) = self.plate {
            edit.plate = plate;
        }
        if let Some(model) = self.model {
            edit.model = model;
        }
        if let Some(date) = self.date {
            edit.service_date = date;
        }
        if let Some(mileage) = self.mileage {
            edit.mileage = mileage;
        }
        if let Some(ledger) = self.ledger {
            edit.repair_ledger = ledger;
        }
        if let Some(total) = self.total {
            edit.total_price = total;
        }
        if let Some(note) = self.note {
            edit.note = note;
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Open the customer book, reporting an unreadable data file as a warning
fn open_book(config: &Config) -> Result<CustomerBook<FileRepository>> {
    let (book, warning) = repository::open_book(config)?;
    if let Some(e) = warning {
        eprintln!("Warning: {}", e);
        eprintln!("Starting with an empty customer list.");
        eprintln!("The unreadable file will be kept as a .bad copy on the next save.");
    }
    Ok(book)
}

/// Execute CLI command
pub fn execute(cli: Cli) -> Result<()> {
    // Load config
    let mut config = Config::load()?;

    // Override from CLI args
    if let Some(ref file) = cli.file {
        config.data_file = Some(file.clone());
    }
    let output_format = cli.format.unwrap_or(config.output_format);

    match cli.command {
        Commands::Add {
            name,
            plate,
            phone,
            model,
            date,
            mileage,
            items,
            note,
        } => {
            let input = NewCustomer {
                name,
                phone,
                plate,
                model,
                service_date: date.unwrap_or_else(today),
                mileage,
                repairs: items,
                note,
            };
            cmd_add(&config, input, output_format)
        }

        Commands::Edit {
            index,
            name,
            phone,
            plate,
            model,
            date,
            mileage,
            ledger,
            total,
            note,
        } => {
            let args = EditArgs {
                name,
                phone,
                plate,
                model,
                date,
                mileage,
                ledger,
                total,
                note,
            };
            cmd_edit(&config, index, args, output_format)
        }

        Commands::Delete { index } => cmd_delete(&config, index),

        Commands::List => cmd_search(&config, "", output_format),

        Commands::Search { keyword } => cmd_search(&config, &keyword, output_format),

        Commands::Next { date, mileage } => {
            let next = compute_next(date.unwrap_or_else(today), mileage);
            output_next(output_format, &next)
        }

        Commands::Export { output, keyword } => cmd_export(&config, output, keyword),

        Commands::Config {
            show,
            set_data_file,
            set_cache_ttl,
            set_output,
            reset,
        } => cmd_config(show, set_data_file, set_cache_ttl, set_output, reset),
    }
}

fn cmd_add(config: &Config, input: NewCustomer, output_format: OutputFormat) -> Result<()> {
    let mut book = open_book(config)?;
    let applied = book.create(input)?;
    let record = &book.records()[applied.index];
    output_applied(output_format, "Added", &applied, record)
}

fn cmd_edit(config: &Config, index: usize, args: EditArgs, output_format: OutputFormat) -> Result<()> {
    let mut book = open_book(config)?;

    let mut edit = match book.records().get(index) {
        Some(record) => CustomerEdit::from_record(record),
        None => {
            return Err(StoreError::IndexOutOfRange {
                index,
                len: book.len(),
            }
            .into())
        }
    };
    args.apply(&mut edit);

    let applied = book.edit(index, edit)?;
    let record = &book.records()[applied.index];
    output_applied(output_format, "Updated", &applied, record)
}

fn cmd_delete(config: &Config, index: usize) -> Result<()> {
    let mut book = open_book(config)?;
    let removed = book.delete(index)?;
    println!("Deleted [{}] {} ({})", index, removed.name, removed.plate);
    Ok(())
}

fn cmd_search(config: &Config, keyword: &str, output_format: OutputFormat) -> Result<()> {
    let book = open_book(config)?;
    let matches = book.search(keyword);

    let title = if keyword.trim().is_empty() {
        "Customer Records".to_string()
    } else {
        format!("Search: {}", keyword.trim())
    };
    output_records(output_format, &title, &matches, book.len())
}

fn cmd_export(config: &Config, output: Option<PathBuf>, keyword: Option<String>) -> Result<()> {
    let book = open_book(config)?;
    let output_path = match output {
        Some(path) => path,
        None => config.data_file()?.with_extension("xlsx"),
    };

    let records: Vec<CustomerRecord> = filter_records(book.records(), keyword.as_deref().unwrap_or(""))
        .into_iter()
        .cloned()
        .collect();

    export_to_excel(&records, &output_path)?;
    println!("Exported {} entries to {}", records.len(), output_path.display());
    Ok(())
}

fn cmd_config(
    show: bool,
    set_data_file: Option<PathBuf>,
    set_cache_ttl: Option<u64>,
    set_output: Option<OutputFormat>,
    reset: bool,
) -> Result<()> {
    if reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        println!("\n{}", config);
        return Ok(());
    }

    let mut config = Config::load()?;
    let mut modified = false;

    if let Some(path) = set_data_file {
        config.data_file = Some(path);
        modified = true;
    }

    if let Some(ttl) = set_cache_ttl {
        config.cache_ttl_secs = ttl;
        modified = true;
    }

    if let Some(output_format) = set_output {
        config.output_format = output_format;
        modified = true;
    }

    if modified {
        config.save()?;
        println!("Configuration updated");
    }

    if show || !modified {
        println!("{}", config);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_args_keep_unset_fields() {
        let mut edit = CustomerEdit {
            name: "王小明".to_string(),
            phone: "0912".to_string(),
            plate: "ABC-123".to_string(),
            model: "Altis".to_string(),
            service_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            mileage: 10000,
            repair_ledger: "換油 ($500)".to_string(),
            total_price: 500,
            note: String::new(),
        };

        EditArgs {
            name: None,
            phone: None,
            plate: Some("ABC-999".to_string()),
            model: None,
            date: None,
            mileage: Some(12000),
            ledger: None,
            total: None,
            note: None,
        }
        .apply(&mut edit);

        assert_eq!(edit.name, "王小明");
        assert_eq!(edit.plate, "ABC-999");
        assert_eq!(edit.mileage, 12000);
        assert_eq!(edit.repair_ledger, "換油 ($500)");
        assert_eq!(edit.total_price, 500);
    }
}
