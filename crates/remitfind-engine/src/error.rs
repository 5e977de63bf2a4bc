use thiserror::Error;

/// Caller errors raised before any collaborator is contacted.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("amount must be a positive number, got {0}")]
    InvalidAmount(f64),

    #[error("invalid currency code \"{0}\": expected three ASCII letters")]
    InvalidCurrency(String),
}
