use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageTableError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("font unavailable ({source_name}): {reason}")]
    FontUnavailable { source_name: String, reason: String },
    #[error("row {row_index} cannot fit on an empty page: {details}")]
    UnplaceableRow { row_index: usize, details: String },
    #[error("pdf error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PageTableError {
    pub(crate) fn font(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        PageTableError::FontUnavailable {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PageTableError>;
