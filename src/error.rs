use thiserror::Error;

#[derive(Error, Debug)]
pub enum CostscanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "xlsx")]
    #[error("XLSX read error: {0}")]
    Xlsx(#[from] calamine::Error),

    #[cfg(feature = "xlsx")]
    #[error("Spreadsheet export error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[cfg(feature = "pdf")]
    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Could not read input: {0}")]
    Ingestion(String),

    #[error("Missing columns (or not recognized): {missing:?}. Detected columns: {detected:?}")]
    MissingColumns {
        missing: Vec<String>,
        detected: Vec<String>,
    },

    #[error("{0}")]
    EmptyResult(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

impl CostscanError {
    /// Empty results are warnings: the input was valid, the filters were too narrow.
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::EmptyResult(_))
    }
}

pub type Result<T> = std::result::Result<T, CostscanError>;
