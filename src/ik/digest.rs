//! Sub-hash generation.
//!
//! Field values are framed as `len(u64, big-endian) || utf8 bytes` before
//! hashing, so the digest input is injective: no value can move bytes
//! across a field boundary, whatever characters it contains.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::config::{DigestEncoding, HashAlgorithm};

/// Encode an ordered field sequence into the exact bytes that get hashed.
pub fn frame<S: AsRef<str>>(fields: &[S]) -> Vec<u8> {
    let capacity = fields.iter().map(|f| 8 + f.as_ref().len()).sum();
    let mut buf = Vec::with_capacity(capacity);
    for field in fields {
        let bytes = field.as_ref().as_bytes();
        buf.extend_from_slice(&(bytes.len() as u64).to_be_bytes());
        buf.extend_from_slice(bytes);
    }
    buf
}

/// Raw digest of the framed fields, truncated to `len` bytes.
pub fn digest_bytes<S: AsRef<str>>(fields: &[S], algorithm: HashAlgorithm, len: usize) -> Vec<u8> {
    let framed = frame(fields);
    let mut out = match algorithm {
        HashAlgorithm::Sha256 => Sha256::digest(&framed).to_vec(),
        HashAlgorithm::Sha384 => Sha384::digest(&framed).to_vec(),
        HashAlgorithm::Sha512 => Sha512::digest(&framed).to_vec(),
    };
    out.truncate(len);
    out
}

/// Hash an ordered field sequence into a fixed-length encoded digest.
///
/// Pure: the same fields, algorithm, length and encoding always yield the
/// same string.
pub fn hash<S: AsRef<str>>(
    fields: &[S],
    algorithm: HashAlgorithm,
    len: usize,
    encoding: DigestEncoding,
) -> String {
    let bytes = digest_bytes(fields, algorithm, len);
    match encoding {
        DigestEncoding::Hex => hex::encode(bytes),
        DigestEncoding::Base64url => URL_SAFE_NO_PAD.encode(bytes),
    }
}
