use crate::error::Result;
use crate::table::{Cell, ReportTable};
use crate::utils::datetime_to_excel_serial;
use log::info;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{DocProperties, ExcelDateTime, Format, Workbook, Worksheet};

/// Writes one sheet per table, in the order given, and returns the
/// workbook bytes. Row 0 holds the column names; there is no index column.
/// The same tables always give the same bytes.
pub fn export_workbook(tables: &[&ReportTable]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    workbook.set_properties(&document_properties()?);
    let header = Format::new().set_bold();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let timestamp_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    for table in tables {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(table.title())?;

        for (col, column) in table.columns.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, column.name.as_str(), &header)?;
        }

        for (idx, row) in table.rows.iter().enumerate() {
            let row_num = (idx + 1) as u32;
            for (col, cell) in row.iter().enumerate() {
                write_cell(
                    worksheet,
                    row_num,
                    col as u16,
                    cell,
                    &date_format,
                    &timestamp_format,
                )?;
            }
        }

        worksheet.autofit();
    }

    let buffer = workbook.save_to_buffer()?;
    info!(
        "Exported {} report sheets ({} bytes)",
        tables.len(),
        buffer.len()
    );
    Ok(buffer)
}

// Pinned so the creation time doesn't vary between runs
fn document_properties() -> Result<DocProperties> {
    let created = ExcelDateTime::from_ymd(2024, 1, 1)?.and_hms(0, 0, 0)?;
    Ok(DocProperties::new()
        .set_title("Ledger Reports")
        .set_creation_datetime(&created))
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    date_format: &Format,
    timestamp_format: &Format,
) -> Result<()> {
    match cell {
        Cell::Blank => {}
        Cell::Text(s) => {
            worksheet.write_string(row, col, s.as_str())?;
        }
        Cell::Amount(d) => {
            worksheet.write_number(row, col, d.to_f64().unwrap_or_default())?;
        }
        Cell::Count(n) => {
            worksheet.write_number(row, col, *n as f64)?;
        }
        Cell::Date(d) => {
            let serial = d
                .and_hms_opt(0, 0, 0)
                .map(datetime_to_excel_serial)
                .unwrap_or_default();
            worksheet.write_number_with_format(row, col, serial, date_format)?;
        }
        Cell::Timestamp(ts) => {
            worksheet.write_number_with_format(
                row,
                col,
                datetime_to_excel_serial(*ts),
                timestamp_format,
            )?;
        }
    }
    Ok(())
}
