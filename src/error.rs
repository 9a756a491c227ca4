use std::collections::TryReserveError;

use derive_more::{Display, From};

pub type Result<T> = core::result::Result<T, TerrainError>;

#[derive(Debug, Display, From, Clone, PartialEq)]
pub enum TerrainError {
    /// A sizing or resolution parameter is outside its accepted range.
    #[display("invalid configuration: {parameter} = {value}")]
    InvalidConfig {
        parameter: &'static str,
        value: String,
    },
    /// The static lookup tables failed their load-time consistency check.
    #[display("invalid lookup table entry {entry}: {reason}")]
    InvalidTables { entry: usize, reason: &'static str },
    /// A vertex, index or lattice count that does not fit its integer range.
    #[display("count {count} exceeds the addressable index range")]
    IndexOverflow { count: usize },
    /// The output buffers could not be allocated.
    #[display("resource exhausted: {_0}")]
    #[from]
    ResourceExhausted(TryReserveError),
}

impl TerrainError {
    pub(crate) fn invalid_config(parameter: &'static str, value: impl ToString) -> Self {
        Self::InvalidConfig {
            parameter,
            value: value.to_string(),
        }
    }
}

impl std::error::Error for TerrainError {}
