use thiserror::Error;

/// Reasons a maze request is rejected before any carving happens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MazeError {
    #[error("maze must be at least 5x5, got {height}x{width}")]
    InvalidDimensions { height: usize, width: usize },
    #[error("minimum separation must be a finite non-negative number, got {0}")]
    InvalidSeparation(f64),
}
