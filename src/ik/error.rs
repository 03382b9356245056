//! Error types for key derivation.

use thiserror::Error;

use crate::amount::AmountError;
use crate::config::ConfigError;
use crate::model::Field;

/// Why a set of raw attributes cannot produce a key.
///
/// Returned by [`normalize`](super::normalize) and [`Deriver::derive`](super::Deriver::derive).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("required field {0} is missing or blank")]
    MissingField(Field),

    #[error("{field} value '{value}' is not in the configured domain")]
    InvalidEnum { field: Field, value: String },

    #[error("invalid TAMT: {0}")]
    InvalidAmount(#[from] AmountError),

    #[error("invalid TTC '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },
}

impl NormalizeError {
    /// The attribute the error is about.
    pub fn field(&self) -> Field {
        match self {
            NormalizeError::MissingField(field) | NormalizeError::InvalidEnum { field, .. } => *field,
            NormalizeError::InvalidAmount(_) => Field::Tamt,
            NormalizeError::InvalidTimestamp { .. } => Field::Ttc,
        }
    }
}

/// Error of the one-shot [`derive_key`](super::derive_key) entry point.
#[derive(Debug, Error)]
pub enum DeriveError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}
