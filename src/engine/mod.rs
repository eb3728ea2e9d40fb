use thiserror::Error;

pub mod cache;
pub mod column;
pub mod filter;
pub mod histogram;
pub mod ingest;
pub mod joint;
pub mod set_ops;

pub use cache::FilterCache;
pub use column::{Dataset, NumericColumn};
pub use histogram::{Bin, HistogramIndex};
pub use ingest::{ParseError, ParseSummary};
pub use joint::JointDistribution;

/// Error type used across the crate
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed input: {0}")]
    Parse(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("No histogram index for column '{0}'; run preprocess first")]
    IndexNotBuilt(String),
}

/// Strictly ascending, duplicate-free sequence of row indices in `[0, N)`.
///
/// This is the currency passed between range filters, the set algebra in
/// [`set_ops`], and the mask parameter of [`joint::dist2d`]. Producing one
/// that violates the ordering contract and feeding it back in is not
/// detected; see the individual operations for their preconditions.
pub type RowSet = Vec<usize>;
