//! Error type for the I/O-facing parts of the crate
//!
//! The simulation itself never fails: numeric degeneracies are clamped and the
//! tick continues. Only loading/saving settings and high scores can error.

use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A settings value outside its valid range.
    #[error("invalid setting: {0}")]
    InvalidSetting(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
