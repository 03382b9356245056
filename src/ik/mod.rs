//! Idempotency key derivation.
//!
//! raw attributes -> [`normalize()`] -> [`band()`] -> two [`hash()`] calls
//! (receiver set, sender set) -> [`compose()`].
//!
//! Derivation is a pure function of the input and the immutable [`Config`]
//! snapshot held by a [`Deriver`]. Any number of derivations may run in
//! parallel on clones of the same deriver.

use std::sync::Arc;

use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info};

use crate::config::{Config, ConfigError};
use crate::model::{PaymentAttributes, RawAttributes, ReceiverHashInput, SenderHashInput};

mod band;
pub use band::{TimeBand, band};

mod digest;
pub use digest::{digest_bytes, frame, hash};

mod error;
pub use error::{DeriveError, NormalizeError};

mod key;
pub use key::{DELIMITER, IdempotencyKey, ParseKeyError, compose};

mod normalize;
pub use normalize::{normalize, parse_timestamp};

/// A derived key together with the band it was locked to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derivation {
    pub key: IdempotencyKey,
    pub band: TimeBand,
}

/// Derives idempotency keys from a fixed configuration snapshot.
///
/// Cloning is cheap and every clone shares the same snapshot. Rotating the
/// configuration means building a new `Deriver`; derivations already running
/// on the old one are unaffected.
#[derive(Debug, Clone)]
pub struct Deriver {
    config: Arc<Config>,
}

/// Public API
impl Deriver {
    /// Validate `config` and build a deriver around it.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        Ok(Self {
            config: Arc::new(config.validated()?),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Derive the key for one transaction.
    pub fn derive(&self, raw: &RawAttributes) -> Result<IdempotencyKey, NormalizeError> {
        self.derive_detailed(raw).map(|derivation| derivation.key)
    }

    /// Derive the key for one transaction, also returning its time band.
    pub fn derive_detailed(&self, raw: &RawAttributes) -> Result<Derivation, NormalizeError> {
        let result = normalize(raw, &self.config).map(|attrs| self.derive_normalized(&attrs));
        Self::log_result(&result);
        result
    }

    /// Derive the key for attributes that are already in canonical form.
    pub fn derive_normalized(&self, attrs: &PaymentAttributes) -> Derivation {
        derive_from(attrs, &self.config)
    }

    /// Derive keys for every record of a stream, in order.
    ///
    /// Each record carries a caller-chosen tag (a line number, a request id)
    /// that is handed back next to its result. Rejected records yield an
    /// `Err` result and do not stop the stream.
    pub fn derive_stream<S, T>(
        &self,
        stream: S,
    ) -> impl Stream<Item = (T, Result<Derivation, NormalizeError>)> + use<S, T>
    where
        S: Stream<Item = (T, RawAttributes)>,
    {
        let deriver = self.clone();
        stream.map(move |(tag, raw)| {
            let result = deriver.derive_detailed(&raw);
            (tag, result)
        })
    }
}

/// Private API
impl Deriver {
    /// Small helper to log `derive` results. Field values are never logged.
    fn log_result(result: &Result<Derivation, NormalizeError>) {
        match result {
            Ok(derivation) => {
                debug!(
                    band = %derivation.band,
                    key = %derivation.key,
                    "key derived"
                );
            }
            Err(e) => {
                info!(
                    field = %e.field(),
                    reason = %e,
                    "derivation rejected"
                );
            }
        }
    }
}

/// Derive one key without keeping a [`Deriver`] around.
///
/// `config` is validated and canonicalized on every call, exactly as
/// [`Deriver::new`] does. Build a deriver once when deriving many keys.
pub fn derive_key(raw: &RawAttributes, config: &Config) -> Result<IdempotencyKey, DeriveError> {
    let deriver = Deriver::new(config.clone())?;
    Ok(deriver.derive(raw)?)
}

fn derive_from(attrs: &PaymentAttributes, config: &Config) -> Derivation {
    let band = band(attrs.ttc, config.interval_minutes);
    let len = config.digest_len();

    let receiver = hash(
        &ReceiverHashInput::new(attrs).fields(),
        config.hash_algorithm,
        len,
        config.digest_encoding,
    );
    let sender = hash(
        &SenderHashInput::new(attrs, band).fields(),
        config.hash_algorithm,
        len,
        config.digest_encoding,
    );

    Derivation {
        key: compose(&receiver, &sender),
        band,
    }
}
