use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Separator between the receiver and sender sub-hashes.
///
/// Neither hex nor unpadded base64url ever produces this character.
pub const DELIMITER: char = '.';

/// The derived key: `<receiver_hash>.<sender_hash>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdempotencyKey {
    value: String,
    split: usize,
}

impl IdempotencyKey {
    pub fn receiver_hash(&self) -> &str {
        &self.value[..self.split]
    }

    pub fn sender_hash(&self) -> &str {
        &self.value[self.split + DELIMITER.len_utf8()..]
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }
}

/// Join the two sub-hashes, receiver first.
pub fn compose(receiver_hash: &str, sender_hash: &str) -> IdempotencyKey {
    debug_assert!(!receiver_hash.contains(DELIMITER));
    debug_assert!(!sender_hash.contains(DELIMITER));
    let mut value = String::with_capacity(receiver_hash.len() + 1 + sender_hash.len());
    value.push_str(receiver_hash);
    value.push(DELIMITER);
    value.push_str(sender_hash);
    IdempotencyKey {
        value,
        split: receiver_hash.len(),
    }
}

/// Error returned when a string is not a well-formed key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a <receiver_hash>.<sender_hash> key")]
pub struct ParseKeyError(String);

impl FromStr for IdempotencyKey {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(DELIMITER) {
            Some((receiver, sender))
                if !receiver.is_empty() && !sender.is_empty() && !sender.contains(DELIMITER) =>
            {
                Ok(compose(receiver, sender))
            }
            _ => Err(ParseKeyError(s.to_string())),
        }
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl AsRef<str> for IdempotencyKey {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl From<IdempotencyKey> for String {
    fn from(key: IdempotencyKey) -> Self {
        key.value
    }
}

impl Serialize for IdempotencyKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}
