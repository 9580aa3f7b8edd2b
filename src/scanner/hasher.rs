//! Streaming file hasher producing 128-bit content digests.
//!
//! # Overview
//!
//! The [`Hasher`] reads a file either partially (the first [`PARTIAL_SIZE`]
//! bytes) or completely (in [`CHUNK_SIZE`] chunks fed into one streaming
//! accumulator) and returns a [`Digest`]. Both supported algorithms produce
//! 16 bytes, so a digest is always rendered as 32 lowercase hex characters.
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::scanner::Hasher;
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let partial = hasher.partial(Path::new("a.bin")).unwrap();
//! let full = hasher.full(Path::new("a.bin")).unwrap();
//! println!("{partial} / {full}");
//! ```

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::HashError;

/// Number of leading bytes digested in the partial phase.
pub const PARTIAL_SIZE: usize = 4096;

/// Read buffer size used for full-content digests.
pub const CHUNK_SIZE: usize = 4096;

/// A 128-bit content digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; 16]);

impl Digest {
    /// Wrap raw digest bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Lowercase hexadecimal representation (32 characters).
    #[must_use]
    pub fn to_hex(&self) -> String {
        hash_to_hex(&self.0)
    }

    /// Parse a 32-character hex string (either case).
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        hex_to_hash(hex).map(Self)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({self})")
    }
}

/// Convert digest bytes to a lowercase hex string.
#[must_use]
pub fn hash_to_hex(bytes: &[u8; 16]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Parse a hex string into digest bytes.
///
/// Returns `None` unless the input is exactly 32 hex digits.
#[must_use]
pub fn hex_to_hash(hex: &str) -> Option<[u8; 16]> {
    if hex.len() != 32 || !hex.is_ascii() {
        return None;
    }
    let mut out = [0u8; 16];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
    }
    Some(out)
}

/// Digest algorithm used by a [`Hasher`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// MD5 (128-bit).
    #[default]
    Md5,
    /// BLAKE3 extendable output truncated to 128 bits.
    Blake3,
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Md5 => write!(f, "md5"),
            Self::Blake3 => write!(f, "blake3"),
        }
    }
}

/// Streaming accumulator over one of the supported algorithms.
enum Accumulator {
    Md5(md5::Context),
    Blake3(Box<blake3::Hasher>),
}

impl Accumulator {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Md5 => Self::Md5(md5::Context::new()),
            HashAlgorithm::Blake3 => Self::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Md5(ctx) => ctx.consume(data),
            Self::Blake3(hasher) => {
                hasher.update(data);
            }
        }
    }

    fn finalize(self) -> Digest {
        match self {
            Self::Md5(ctx) => Digest(ctx.compute().0),
            Self::Blake3(hasher) => {
                let mut out = [0u8; 16];
                hasher.finalize_xof().fill(&mut out);
                Digest(out)
            }
        }
    }
}

/// File hasher for the partial and full phases of duplicate detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hasher {
    algorithm: HashAlgorithm,
}

impl Hasher {
    /// Create a hasher using the default algorithm (MD5).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the digest algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// The configured algorithm.
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Digest a file, either its first [`PARTIAL_SIZE`] bytes or all of it.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or a read fails
    /// partway through.
    pub fn digest(&self, path: &Path, full_scan: bool) -> Result<Digest, HashError> {
        if full_scan {
            self.full(path)
        } else {
            self.partial(path)
        }
    }

    /// Digest at most the first [`PARTIAL_SIZE`] bytes of a file.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read.
    pub fn partial(&self, path: &Path) -> Result<Digest, HashError> {
        log::trace!("Hashing first {} bytes: {}", PARTIAL_SIZE, path.display());

        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let mut buffer = Vec::with_capacity(PARTIAL_SIZE);
        file.take(PARTIAL_SIZE as u64)
            .read_to_end(&mut buffer)
            .map_err(|e| HashError::from_io(path, e))?;

        Ok(self.digest_bytes(&buffer))
    }

    /// Digest the entire content of a file, streaming [`CHUNK_SIZE`] bytes at a time.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or a read fails.
    pub fn full(&self, path: &Path) -> Result<Digest, HashError> {
        log::trace!("Hashing full content: {}", path.display());

        let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let mut accumulator = Accumulator::new(self.algorithm);
        let mut buffer = [0u8; CHUNK_SIZE];

        loop {
            match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => accumulator.update(&buffer[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path, e)),
            }
        }

        Ok(accumulator.finalize())
    }

    /// Digest an in-memory buffer with the configured algorithm.
    #[must_use]
    pub fn digest_bytes(&self, data: &[u8]) -> Digest {
        let mut accumulator = Accumulator::new(self.algorithm);
        accumulator.update(data);
        accumulator.finalize()
    }
}
