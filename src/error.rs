//! Error types for grid construction and search.

use grid_util::Point;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The grid parameters cannot produce a usable grid.
    #[error("Invalid grid configuration: {0}")]
    InvalidConfig(String),

    /// A heap was asked to hold more items than it was sized for. Search always
    /// sizes its heap to the cell count, so this points at a programming error.
    #[error("Heap capacity of {capacity} exceeded")]
    CapacityExceeded { capacity: usize },

    /// The open set ran dry before the target was reached.
    #[error("No path found from {start:?} to {target:?}")]
    NoPathFound { start: Point, target: Point },

    #[error("Search budget exhausted after {expansions} expansions")]
    BudgetExhausted { expansions: usize },

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Parse(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::CapacityExceeded { capacity: 4 };
        assert_eq!(err.to_string(), "Heap capacity of 4 exceeded");

        let err = Error::NoPathFound {
            start: Point::new(0, 0),
            target: Point::new(3, 1),
        };
        assert!(err.to_string().starts_with("No path found"));
    }
}
