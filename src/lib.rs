pub mod amount;
pub mod config;
pub mod csv;
pub mod ik;
pub mod model;

pub use amount::{Amount, AmountError};
pub use config::{Config, ConfigError, DigestEncoding, HashAlgorithm};
pub use ik::{DeriveError, Derivation, Deriver, IdempotencyKey, NormalizeError, TimeBand, derive_key};
pub use model::{Field, PaymentAttributes, RawAmount, RawAttributes};
