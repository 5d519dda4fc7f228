use thiserror::Error;

/// Errors produced when assembling or running a network.
///
/// All failures stem from static misconfiguration: `Configuration` surfaces at
/// construction time, `ShapeMismatch` at forward time when channel counts fail
/// to align. Neither is retriable; a network stays usable for well-formed
/// inputs after a `ShapeMismatch`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("shape mismatch in {what}: got {got} channels, expected {expected}")]
    ShapeMismatch {
        /// Context for the mismatch (e.g. "zero-pad shortcut").
        what: &'static str,
        /// Observed channel count.
        got: usize,
        /// Expected channel count.
        expected: usize,
    },

    #[error(transparent)]
    Candle(#[from] candle_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
