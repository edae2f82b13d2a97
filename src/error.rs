use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the simulator
#[derive(Error, Debug)]
pub enum SimulatorError {
    #[error("Failed to load memory image: {0}")]
    ImageLoadError(#[from] ImageError),

    #[error("CPU execution error: {0}")]
    ExecutionError(#[from] ExecutionError),

    #[error("Memory error: {0}")]
    MemoryError(#[from] MemoryError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

/// Errors related to memory image files
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Failed to read image file '{0}': {1}")]
    FileReadError(PathBuf, #[source] std::io::Error),

    #[error("Invalid hex byte '{1}' at line {2} of '{0}'")]
    ParseError(PathBuf, String, usize),
}

/// Errors related to CPU execution
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Execution limit reached: {0} cycles")]
    ExecutionLimitReached(i32),
}

/// Errors related to memory operations
#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("Word access out of bounds at address {0:#010x}")]
    AddressOutOfBounds(u32),
}

/// Type alias for Result with SimulatorError
pub type SimulatorResult<T> = Result<T, SimulatorError>;
