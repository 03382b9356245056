//! Process-wide derivation settings.
//!
//! A [`Config`] is loaded once at startup, validated, and then only read.
//! Every way of obtaining one goes through [`Config::validated`], so a
//! misconfiguration fails before the first key is derived.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// Errors raised while loading or validating a [`Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("interval_minutes must be positive and at most {max}, got {0}", max = Config::MAX_INTERVAL_MINUTES)]
    InvalidInterval(u64),

    #[error("{0} domain must not be empty")]
    EmptyDomain(&'static str),

    #[error("{0} domain contains a blank code")]
    InvalidCode(&'static str),

    #[error("digest_bytes must be between {min} and {max} for {algorithm}, got {got}")]
    InvalidDigestLength {
        algorithm: HashAlgorithm,
        min: usize,
        max: usize,
        got: usize,
    },
}

/// Hash function used for both sub-hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum HashAlgorithm {
    #[default]
    #[serde(rename = "sha-256")]
    Sha256,
    #[serde(rename = "sha-384")]
    Sha384,
    #[serde(rename = "sha-512")]
    Sha512,
}

impl HashAlgorithm {
    /// Full digest length in bytes.
    pub fn output_len(self) -> usize {
        match self {
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HashAlgorithm::Sha256 => "sha-256",
            HashAlgorithm::Sha384 => "sha-384",
            HashAlgorithm::Sha512 => "sha-512",
        })
    }
}

/// Text encoding of a digest. No supported alphabet contains `.`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestEncoding {
    /// Lowercase hexadecimal.
    #[default]
    Hex,
    /// URL-safe base64 without padding.
    Base64url,
}

impl fmt::Display for DigestEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DigestEncoding::Hex => "hex",
            DigestEncoding::Base64url => "base64url",
        })
    }
}

/// Derivation settings shared by every call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Length of a time band.
    pub interval_minutes: u64,
    pub hash_algorithm: HashAlgorithm,
    pub digest_encoding: DigestEncoding,
    /// Truncate each digest to this many bytes. `None` keeps the full output.
    pub digest_bytes: Option<usize>,
    /// Allowed narration codes. May be empty, in which case only an empty ITN is accepted.
    pub itn_domain: BTreeSet<String>,
    /// Allowed client-type codes. Must not be empty.
    pub ctype_domain: BTreeSet<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_minutes: 15,
            hash_algorithm: HashAlgorithm::default(),
            digest_encoding: DigestEncoding::default(),
            digest_bytes: None,
            itn_domain: BTreeSet::new(),
            ctype_domain: ["WEB_APP", "MOBILE_APP", "WEB_API", "DESKTOP_APP", "OTHER"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl Config {
    /// Shortest truncated digest accepted (128 bits).
    pub const MIN_DIGEST_BYTES: usize = 16;

    /// Largest interval whose length in seconds still fits an `i64`.
    pub const MAX_INTERVAL_MINUTES: u64 = i64::MAX as u64 / 60;

    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(s)?;
        config.validated()
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        info!(
            interval_minutes = config.interval_minutes,
            hash_algorithm = %config.hash_algorithm,
            digest_encoding = %config.digest_encoding,
            "config loaded"
        );
        Ok(config)
    }

    /// Canonicalize domain codes and check every invariant.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        self.itn_domain = canonical_domain("ITN", self.itn_domain)?;
        self.ctype_domain = canonical_domain("CTYPE", self.ctype_domain)?;
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_minutes == 0 || self.interval_minutes > Self::MAX_INTERVAL_MINUTES {
            return Err(ConfigError::InvalidInterval(self.interval_minutes));
        }
        if self.ctype_domain.is_empty() {
            return Err(ConfigError::EmptyDomain("CTYPE"));
        }
        if let Some(got) = self.digest_bytes {
            let max = self.hash_algorithm.output_len();
            if !(Self::MIN_DIGEST_BYTES..=max).contains(&got) {
                return Err(ConfigError::InvalidDigestLength {
                    algorithm: self.hash_algorithm,
                    min: Self::MIN_DIGEST_BYTES,
                    max,
                    got,
                });
            }
        }
        Ok(())
    }

    /// Number of digest bytes actually emitted per sub-hash.
    pub fn digest_len(&self) -> usize {
        self.digest_bytes
            .unwrap_or_else(|| self.hash_algorithm.output_len())
    }
}

/// Canonical form of an enumerated code: trimmed, ASCII upper-case.
pub(crate) fn canonical_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

fn canonical_domain(
    name: &'static str,
    domain: BTreeSet<String>,
) -> Result<BTreeSet<String>, ConfigError> {
    domain
        .into_iter()
        .map(|code| {
            let code = canonical_code(&code);
            if code.is_empty() {
                Err(ConfigError::InvalidCode(name))
            } else {
                Ok(code)
            }
        })
        .collect()
}
