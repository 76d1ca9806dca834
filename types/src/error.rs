//! Errors raised by the shared types.

use thiserror::Error;

/// Fixed-point arithmetic failures.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("arithmetic overflow")]
    Overflow,

    #[error("division by zero")]
    DivisionByZero,
}

#[derive(Debug, Error)]
pub enum TypesError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error(transparent)]
    Math(#[from] MathError),
}
