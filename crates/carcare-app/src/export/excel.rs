//! Excel export of customer records

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use carcare_domain::CustomerRecord;
use carcare_infra::persistence::LEGACY_COLUMNS;
use carcare_types::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

fn excel_error(e: XlsxError) -> Error {
    Error::Excel(e.to_string())
}

/// Export records to an Excel file laid out like the shop's original spreadsheet
pub fn export_to_excel(records: &[CustomerRecord], output_path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    write_customer_sheet(sheet, records)?;

    workbook.save(output_path).map_err(excel_error)?;
    log::info!("Exported {} records to {}", records.len(), output_path.display());

    Ok(())
}

fn write_customer_sheet(sheet: &mut Worksheet, records: &[CustomerRecord]) -> Result<()> {
    sheet.set_name("Customers").map_err(excel_error)?;

    let header_format = Format::new().set_bold();
    for (col, header) in LEGACY_COLUMNS.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(excel_error)?;
    }

    for (i, record) in records.iter().enumerate() {
        let row = (i + 1) as u32;
        let service_date = record.service_date().format(DATE_FORMAT).to_string();
        let next_date = record.next_service_date().format(DATE_FORMAT).to_string();
        let ledger = record.repair_ledger.format();

        let text_cells: [(u16, &str); 8] = [
            (0, record.name.as_str()),
            (1, record.phone.as_str()),
            (2, record.plate.as_str()),
            (3, record.model.as_str()),
            (4, service_date.as_str()),
            (6, next_date.as_str()),
            (8, ledger.as_str()),
            (10, record.note.as_str()),
        ];
        for (col, value) in text_cells {
            sheet.write_string(row, col, value).map_err(excel_error)?;
        }

        let number_cells = [
            (5, record.mileage()),
            (7, record.next_mileage()),
            (9, record.total_price),
        ];
        for (col, value) in number_cells {
            sheet
                .write_number(row, col, value as f64)
                .map_err(excel_error)?;
        }
    }

    sheet.set_column_width(8, 40).map_err(excel_error)?;

    Ok(())
}
