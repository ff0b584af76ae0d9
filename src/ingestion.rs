use crate::error::{LedgerError, Result};
use crate::utils::{excel_serial_to_datetime, parse_timestamp};
use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use chrono::NaiveDateTime;
use csv::ReaderBuilder;
use log::debug;
use std::io::Cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Xlsx,
}

impl InputFormat {
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(InputFormat::Csv),
            "xlsx" => Ok(InputFormat::Xlsx),
            _ => Err(LedgerError::UnsupportedFormat(file_name.to_string())),
        }
    }
}

/// A cell as it came out of the source file, before any coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
}

impl RawCell {
    pub fn is_empty(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Textual form of the cell. Whole numbers print without a fraction so
    /// numeric client IDs from spreadsheets read as "1001", not "1001.0".
    pub fn as_text(&self) -> Option<String> {
        match self {
            RawCell::Empty => None,
            RawCell::Text(s) if s.trim().is_empty() => None,
            RawCell::Text(s) => Some(s.clone()),
            RawCell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                Some(format!("{}", *n as i64))
            }
            RawCell::Number(n) => Some(n.to_string()),
            RawCell::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            RawCell::Empty => None,
            RawCell::Text(s) => parse_timestamp(s),
            RawCell::Number(n) => excel_serial_to_datetime(*n),
            RawCell::DateTime(dt) => Some(*dt),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

pub fn read_table(bytes: &[u8], format: InputFormat) -> Result<RawTable> {
    let table = match format {
        InputFormat::Csv => read_csv(bytes)?,
        InputFormat::Xlsx => read_xlsx(bytes)?,
    };
    debug!(
        "Read {:?} input with {} columns and {} rows",
        format,
        table.headers.len(),
        table.rows.len()
    );
    Ok(table)
}

pub fn read_csv(bytes: &[u8]) -> Result<RawTable> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(clean_header).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(LedgerError::EmptyInput);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row = record
            .iter()
            .map(|value| {
                if value.trim().is_empty() {
                    RawCell::Empty
                } else {
                    RawCell::Text(value.to_string())
                }
            })
            .collect();
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}

/// Reads the first worksheet; its first row is the header.
pub fn read_xlsx(bytes: &[u8]) -> Result<RawTable> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LedgerError::EmptyInput)??;

    let mut rows_iter = range.rows();
    let headers: Vec<String> = rows_iter
        .next()
        .ok_or(LedgerError::EmptyInput)?
        .iter()
        .map(|cell| convert_cell(cell).as_text().map(|h| clean_header(&h)).unwrap_or_default())
        .collect();

    let rows = rows_iter
        .map(|row| row.iter().map(convert_cell).collect::<Vec<_>>())
        .filter(|row| !row.iter().all(RawCell::is_empty))
        .collect();

    Ok(RawTable { headers, rows })
}

fn clean_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_string()
}

fn convert_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Empty | Data::Error(_) => RawCell::Empty,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            if s.trim().is_empty() {
                RawCell::Empty
            } else {
                RawCell::Text(s.clone())
            }
        }
        Data::Float(f) => RawCell::Number(*f),
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::Bool(b) => RawCell::Text(b.to_string()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(RawCell::DateTime)
            .unwrap_or(RawCell::Number(dt.as_f64())),
    }
}
