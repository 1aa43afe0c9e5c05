//! Spreadsheet export

mod excel;

pub use excel::export_to_excel;
