//! CSV-backed record repository
//!
//! One row per record under an 11-column header. Saves rewrite the whole file.
//! Files written by the older spreadsheet workflow (Chinese headers, Big5 text) load too.

use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use encoding_rs::BIG5;
use thiserror::Error;

use carcare_domain::{CustomerRecord, RecordFields, RecordRepository, RepairLedger};
use carcare_types::{Error, PersistError, StoreError};

/// Column header written on save
pub const COLUMNS: [&str; 11] = [
    "name",
    "phone",
    "plate",
    "model",
    "service_date",
    "mileage",
    "next_service_date",
    "next_mileage",
    "repair_ledger",
    "total_price",
    "note",
];

/// Column header of the original spreadsheet, accepted on load
pub const LEGACY_COLUMNS: [&str; 11] = [
    "姓名",
    "電話",
    "車牌",
    "車型",
    "本次保養日期",
    "本次里程",
    "下次保養日期",
    "下次保養里程",
    "維修明細",
    "總金額",
    "備註",
];

const DATE_FORMAT: &str = "%Y-%m-%d";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Error, Debug)]
enum CsvRecordError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Csv(#[from] csv::Error),

    #[error("unexpected header: {0}")]
    Header(String),

    #[error("invalid date in row {row}, column {column}: {value:?}")]
    InvalidDate {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("invalid number in row {row}, column {column}: {value:?}")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("invalid record in row {row}: {source}")]
    InvalidRecord { row: usize, source: StoreError },
}

/// File-based customer record repository (CSV)
pub struct CsvRecordRepository {
    csv_path: PathBuf,
}

impl CsvRecordRepository {
    pub fn new(csv_path: PathBuf) -> Self {
        Self { csv_path }
    }

    /// Get the CSV path
    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }

    fn sibling_path(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .csv_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(suffix);
        self.csv_path.with_file_name(name)
    }

    fn temp_path(&self) -> PathBuf {
        self.sibling_path(".tmp")
    }

    /// First free `<file>.bad`, `<file>.bad.1`, ... path
    fn set_aside_path(&self) -> PathBuf {
        let mut path = self.sibling_path(".bad");
        let mut n = 1;
        while path.exists() {
            path = self.sibling_path(&format!(".bad.{}", n));
            n += 1;
        }
        path
    }

    fn read_all(&self) -> Result<Vec<CustomerRecord>, CsvRecordError> {
        let bytes = fs::read(&self.csv_path)?;
        let text = decode(&bytes);
        parse_records(&text)
    }

    fn write_all(&self, records: &[CustomerRecord]) -> Result<(), CsvRecordError> {
        if let Some(parent) = self.csv_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.temp_path();
        let result = write_records(&temp_path, records)
            .and_then(|()| fs::rename(&temp_path, &self.csv_path).map_err(Into::into));
        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        result
    }
}

impl RecordRepository for CsvRecordRepository {
    fn load(&self) -> Result<Vec<CustomerRecord>, Error> {
        if !self.csv_path.exists() {
            log::debug!("{} does not exist, starting empty", self.csv_path.display());
            return Ok(Vec::new());
        }

        let records = self.read_all().map_err(|e| PersistError::Read {
            path: self.location(),
            reason: e.to_string(),
        })?;
        log::debug!("Loaded {} records from {}", records.len(), self.csv_path.display());
        Ok(records)
    }

    fn save(&self, records: &[CustomerRecord]) -> Result<(), Error> {
        self.write_all(records).map_err(|e| PersistError::Write {
            path: self.location(),
            reason: e.to_string(),
        })?;
        log::debug!("Saved {} records to {}", records.len(), self.csv_path.display());
        Ok(())
    }

    fn location(&self) -> String {
        self.csv_path.display().to_string()
    }

    fn set_aside(&self) -> Result<Option<String>, Error> {
        if !self.csv_path.exists() {
            return Ok(None);
        }

        let target = self.set_aside_path();
        fs::rename(&self.csv_path, &target).map_err(|e| PersistError::Write {
            path: self.location(),
            reason: format!("could not move unreadable file to {}: {}", target.display(), e),
        })?;
        log::warn!("Moved {} to {}", self.csv_path.display(), target.display());
        Ok(Some(target.display().to_string()))
    }
}

/// Decode file bytes: UTF-8 (optionally with BOM), otherwise Big5
fn decode(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Cow::Borrowed(text);
    }

    let (decoded, had_errors) = BIG5.decode_without_bom_handling(bytes);
    if had_errors {
        log::warn!("Some characters could not be decoded from Big5");
    }
    decoded
}

fn parse_records(text: &str) -> Result<Vec<CustomerRecord>, CsvRecordError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    validate_headers(&headers)?;

    let mut records = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let row = result?;
        let row_num = row_idx + 2; // header is row 1
        records.push(parse_row(&row, row_num)?);
    }
    Ok(records)
}

fn validate_headers(headers: &csv::StringRecord) -> Result<(), CsvRecordError> {
    let found: Vec<&str> = headers.iter().map(str::trim).collect();
    if found == COLUMNS || found == LEGACY_COLUMNS {
        Ok(())
    } else {
        Err(CsvRecordError::Header(found.join(",")))
    }
}

fn parse_row(row: &csv::StringRecord, row_num: usize) -> Result<CustomerRecord, CsvRecordError> {
    let field = |i: usize| row.get(i).unwrap_or("");

    let service_date = parse_date(field(4), row_num, COLUMNS[4])?;
    let mileage = parse_count(field(5), row_num, COLUMNS[5])?;
    let stored_next_date = parse_date(field(6), row_num, COLUMNS[6])?;
    let stored_next_mileage = parse_count(field(7), row_num, COLUMNS[7])?;
    let total_price = parse_count(field(9), row_num, COLUMNS[9])?;

    let record = CustomerRecord::new(RecordFields {
        name: field(0).to_string(),
        phone: field(1).to_string(),
        plate: field(2).to_string(),
        model: field(3).to_string(),
        service_date,
        mileage,
        repair_ledger: RepairLedger::parse(field(8)),
        total_price,
        note: field(10).to_string(),
    });
    record
        .validate()
        .map_err(|source| CsvRecordError::InvalidRecord { row: row_num, source })?;

    if record.next_service_date() != stored_next_date || record.next_mileage() != stored_next_mileage {
        log::warn!(
            "Row {}: stored next service {} / {} recomputed as {} / {}",
            row_num,
            stored_next_date,
            stored_next_mileage,
            record.next_service_date(),
            record.next_mileage()
        );
    }

    Ok(record)
}

fn parse_date(s: &str, row: usize, column: &'static str) -> Result<NaiveDate, CsvRecordError> {
    let s = s.trim();
    // Spreadsheet exports sometimes carry a time part or slashes
    let date_part = s.split_whitespace().next().unwrap_or("");
    ["%Y-%m-%d", "%Y/%m/%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
        .ok_or_else(|| CsvRecordError::InvalidDate {
            row,
            column,
            value: s.to_string(),
        })
}

/// Parse a non-negative integer, tolerating a zero fractional part ("10000.0")
fn parse_count(s: &str, row: usize, column: &'static str) -> Result<u64, CsvRecordError> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(0);
    }
    if let Ok(n) = s.parse::<u64>() {
        return Ok(n);
    }
    match s.parse::<f64>() {
        Ok(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(f as u64),
        _ => Err(CsvRecordError::InvalidNumber {
            row,
            column,
            value: s.to_string(),
        }),
    }
}

fn write_records(path: &Path, records: &[CustomerRecord]) -> Result<(), CsvRecordError> {
    let mut file = BufWriter::new(File::create(path)?);
    file.write_all(UTF8_BOM)?;

    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(COLUMNS)?;
    for record in records {
        writer.write_record(to_row(record))?;
    }
    writer.flush()?;
    Ok(())
}

fn to_row(record: &CustomerRecord) -> [String; 11] {
    [
        record.name.clone(),
        record.phone.clone(),
        record.plate.clone(),
        record.model.clone(),
        record.service_date().format(DATE_FORMAT).to_string(),
        record.mileage().to_string(),
        record.next_service_date().format(DATE_FORMAT).to_string(),
        record.next_mileage().to_string(),
        record.repair_ledger.format(),
        record.total_price.to_string(),
        record.note.clone(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, NamedTempFile};

    fn record(name: &str, plate: &str, items: &[(&str, u64)]) -> CustomerRecord {
        let repair_ledger = RepairLedger::from_slots(items.iter().copied());
        CustomerRecord::new(RecordFields {
            name: name.to_string(),
            phone: "0912-000-111".to_string(),
            plate: plate.to_string(),
            model: "Altis".to_string(),
            service_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            mileage: 10000,
            total_price: repair_ledger.total().unwrap_or(0),
            repair_ledger,
            note: "回廠, 下次換輪胎".to_string(),
        })
    }

    fn write_file(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let repo = CsvRecordRepository::new(dir.path().join("customers.csv"));
        assert!(repo.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let repo = CsvRecordRepository::new(dir.path().join("data").join("customers.csv"));
        let records = vec![
            record("王小明", "ABC-123", &[("換油", 500), ("機油芯", 250)]),
            record("Lin", "XYZ-789", &[]),
        ];

        repo.save(&records).unwrap();
        let loaded = repo.load().unwrap();
        assert_eq!(loaded, records);
        assert!(!dir.path().join("data").join("customers.csv.tmp").exists());
    }

    #[test]
    fn test_saved_file_layout() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("customers.csv");
        let repo = CsvRecordRepository::new(path.clone());
        repo.save(&[record("王小明", "ABC-123", &[("換油", 500)])]).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), COLUMNS.join(","));
        assert_eq!(
            lines.next().unwrap(),
            "王小明,0912-000-111,ABC-123,Altis,2024-01-15,10000,2024-07-15,15000,換油 ($500),500,\"回廠, 下次換輪胎\""
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempdir().unwrap();
        let repo = CsvRecordRepository::new(dir.path().join("customers.csv"));
        repo.save(&[record("a", "1", &[]), record("b", "2", &[])]).unwrap();
        repo.save(&[record("c", "3", &[])]).unwrap();

        let loaded = repo.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "c");
    }

    #[test]
    fn test_empty_store_writes_header() {
        let dir = tempdir().unwrap();
        let repo = CsvRecordRepository::new(dir.path().join("customers.csv"));
        repo.save(&[]).unwrap();
        assert!(repo.load().unwrap().is_empty());
    }

    #[test]
    fn test_load_legacy_header() {
        let content = "姓名,電話,車牌,車型,本次保養日期,本次里程,下次保養日期,下次保養里程,維修明細,總金額,備註\n\
                       王小明,0912,ABC-123,Altis,2024-01-15,10000,2024-07-15,15000,換油 ($500),500,\n";
        let file = write_file(content.as_bytes());
        let repo = CsvRecordRepository::new(file.path().to_path_buf());
        let loaded = repo.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].plate, "ABC-123");
        assert_eq!(loaded[0].repair_ledger.total(), Some(500));
    }

    #[test]
    fn test_load_big5() {
        let content = "姓名,電話,車牌,車型,本次保養日期,本次里程,下次保養日期,下次保養里程,維修明細,總金額,備註\n\
                       陳大文,,KLM-456,,2024/03/01,20000.0,2024/09/01,25000,輪胎 ($3200),3200,\n";
        let (encoded, _, _) = BIG5.encode(content);
        let file = write_file(&encoded);
        let repo = CsvRecordRepository::new(file.path().to_path_buf());
        let loaded = repo.load().unwrap();
        assert_eq!(loaded[0].name, "陳大文");
        assert_eq!(loaded[0].mileage(), 20000);
        assert_eq!(
            loaded[0].next_service_date(),
            NaiveDate::from_ymd_opt(2024, 9, 1).unwrap()
        );
    }

    #[test]
    fn test_load_recomputes_derived_fields() {
        let content = format!(
            "{}\nLin,,XYZ-789,,2024-08-31,100,2099-01-01,1,,0,\n",
            COLUMNS.join(",")
        );
        let file = write_file(content.as_bytes());
        let repo = CsvRecordRepository::new(file.path().to_path_buf());
        let loaded = repo.load().unwrap();
        assert_eq!(
            loaded[0].next_service_date(),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
        assert_eq!(loaded[0].next_mileage(), 5100);
    }

    #[test]
    fn test_malformed_file_is_read_error() {
        let content = format!(
            "{}\nLin,,XYZ-789,,not-a-date,100,2025-02-28,5100,,0,\n",
            COLUMNS.join(",")
        );
        let file = write_file(content.as_bytes());
        let repo = CsvRecordRepository::new(file.path().to_path_buf());
        match repo.load() {
            Err(Error::Persist(PersistError::Read { reason, .. })) => {
                assert!(reason.contains("row 2"), "{}", reason)
            }
            other => panic!("expected read error, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_name_row_is_read_error() {
        let content = format!(
            "{}\nLin,,XYZ-789,,2024-01-15,100,2024-07-15,5100,,0,\n,,  ,,2024-01-15,100,2024-07-15,5100,,0,\n",
            COLUMNS.join(",")
        );
        let file = write_file(content.as_bytes());
        let repo = CsvRecordRepository::new(file.path().to_path_buf());
        match repo.load() {
            Err(Error::Persist(PersistError::Read { reason, .. })) => {
                assert!(reason.contains("row 3"), "{}", reason);
                assert!(reason.contains("name"), "{}", reason);
            }
            other => panic!("expected read error, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_plate_row_is_read_error() {
        let content = format!(
            "{}\nLin,0912,,,2024-01-15,100,2024-07-15,5100,,0,\n",
            COLUMNS.join(",")
        );
        let file = write_file(content.as_bytes());
        let repo = CsvRecordRepository::new(file.path().to_path_buf());
        assert!(matches!(
            repo.load(),
            Err(Error::Persist(PersistError::Read { .. }))
        ));
    }

    #[test]
    fn test_set_aside_keeps_unreadable_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("customers.csv");
        fs::write(&path, "id,name\n1,Lin\n").unwrap();
        fs::write(dir.path().join("customers.csv.bad"), "older").unwrap();

        let repo = CsvRecordRepository::new(path.clone());
        let moved_to = repo.set_aside().unwrap().unwrap();
        assert!(moved_to.ends_with("customers.csv.bad.1"), "{}", moved_to);
        assert!(!path.exists());
        assert_eq!(fs::read_to_string(&moved_to).unwrap(), "id,name\n1,Lin\n");
        assert_eq!(
            fs::read_to_string(dir.path().join("customers.csv.bad")).unwrap(),
            "older"
        );

        assert_eq!(repo.set_aside().unwrap(), None);
    }

    #[test]
    fn test_wrong_header_is_read_error() {
        let file = write_file(b"id,name\n1,Lin\n");
        let repo = CsvRecordRepository::new(file.path().to_path_buf());
        assert!(matches!(
            repo.load(),
            Err(Error::Persist(PersistError::Read { .. }))
        ));
    }

    #[test]
    fn test_unwritable_path_is_write_error() {
        let blocker = NamedTempFile::new().unwrap();
        let repo = CsvRecordRepository::new(blocker.path().join("customers.csv"));
        let err = repo.save(&[record("a", "1", &[])]).unwrap_err();
        assert!(err.is_write_failure());
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("15000", 2, "mileage").unwrap(), 15000);
        assert_eq!(parse_count("15000.0", 2, "mileage").unwrap(), 15000);
        assert_eq!(parse_count("", 2, "mileage").unwrap(), 0);
        assert!(parse_count("-5", 2, "mileage").is_err());
        assert!(parse_count("1.5", 2, "mileage").is_err());
    }
}
