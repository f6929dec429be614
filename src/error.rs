//! Error types shared by the error, substitution and population models.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    /// Inputs that can never produce a valid model (wrong data type, conflicting
    /// parameterizations, malformed frequencies).
    #[error("configuration error: {message}")]
    Config { message: String },

    /// An observed code or true state outside the data type.
    #[error("state index {index} is invalid for a data type with {count} entries")]
    InvalidState { index: usize, count: usize },

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, ModelError>;

impl ModelError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn invalid_state(index: usize, count: usize) -> Self {
        Self::InvalidState { index, count }
    }

    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }
}
