/// Errors raised while configuring mappers or building fit tables.
///
/// Statistical fit failures are not errors; they leave the cell out of the
/// fit table.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuantileMapError {
    /// A [`QmConfig`](crate::QmConfig) field is out of range.
    #[error("invalid quantile-mapping configuration: {reason}")]
    InvalidConfig {
        /// What was wrong.
        reason: String,
    },

    /// A cell key was built with a month outside 1..=12.
    #[error("month {month} is not in 1..=12")]
    InvalidMonth {
        /// The rejected month.
        month: u8,
    },

    /// A fit table already holds an entry, fitted or skipped, for a cell.
    #[error("fit table already contains an entry for {key}")]
    DuplicateKey {
        /// Display form of the cell key.
        key: String,
    },
}
