use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Missing required field '{column}' on row {row}")]
    MissingField { row: usize, column: String },

    #[error("Invalid number '{value}' in column '{column}' on row {row}")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid report request: {0}")]
    ValidationError(String),

    #[error("Input contains no worksheet or header row")]
    EmptyInput,

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Spreadsheet read error: {0}")]
    XlsxReadError(#[from] calamine::XlsxError),

    #[error("Spreadsheet write error: {0}")]
    XlsxWriteError(#[from] rust_xlsxwriter::XlsxError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
