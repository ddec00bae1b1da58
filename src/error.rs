use thiserror::Error;

/// Failures that reject a whole conversion.
///
/// Problems with a single row never show up here, they are collected in
/// [`crate::ingest::BatchSummary`] instead.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("no valid data found in input")]
    NoValidData,

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("failed to read csv: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to write kml: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("failed to build archive: {0}")]
    Archive(#[from] zip::result::ZipError),
}

impl ConvertError {
    /// Whether the failure was caused by the uploaded data rather than by the converter.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ConvertError::MissingColumns(_)
                | ConvertError::NoValidData
                | ConvertError::InvalidOption(_)
                | ConvertError::Csv(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
