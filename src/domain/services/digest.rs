//! Incremental content digests
//!
//! Decoded sectors are fed chunk by chunk into an accumulator that is
//! finalised exactly once, so images of any size can be fingerprinted
//! without holding them in memory.

use sha2::{Digest, Sha256, Sha512};
use std::fmt;
use std::str::FromStr;

/// Supported digest algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Crc32,
    Md5,
    Sha256,
    Sha512,
}

impl DigestAlgorithm {
    pub const ALL: [DigestAlgorithm; 4] = [
        DigestAlgorithm::Crc32,
        DigestAlgorithm::Md5,
        DigestAlgorithm::Sha256,
        DigestAlgorithm::Sha512,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DigestAlgorithm::Crc32 => "crc32",
            DigestAlgorithm::Md5 => "md5",
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Sha512 => "sha512",
        }
    }

    /// Length of the digest in hex characters
    pub fn hex_len(&self) -> usize {
        match self {
            DigestAlgorithm::Crc32 => 8,
            DigestAlgorithm::Md5 => 32,
            DigestAlgorithm::Sha256 => 64,
            DigestAlgorithm::Sha512 => 128,
        }
    }

    /// Infers the algorithm from the length of an expected hex digest
    pub fn from_hex_len(len: usize) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|a| a.hex_len() == len)
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "crc32" => Ok(DigestAlgorithm::Crc32),
            "md5" => Ok(DigestAlgorithm::Md5),
            "sha256" | "sha-256" => Ok(DigestAlgorithm::Sha256),
            "sha512" | "sha-512" => Ok(DigestAlgorithm::Sha512),
            other => Err(format!("unknown digest algorithm '{}'", other)),
        }
    }
}

enum State {
    Crc32(crc32fast::Hasher),
    Md5(md5::Context),
    Sha256(Sha256),
    Sha512(Sha512),
}

/// Feed-chunks-then-finalise digest accumulator
pub struct DigestAccumulator {
    algorithm: DigestAlgorithm,
    state: State,
    bytes_fed: u64,
}

impl DigestAccumulator {
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        let state = match algorithm {
            DigestAlgorithm::Crc32 => State::Crc32(crc32fast::Hasher::new()),
            DigestAlgorithm::Md5 => State::Md5(md5::Context::new()),
            DigestAlgorithm::Sha256 => State::Sha256(Sha256::new()),
            DigestAlgorithm::Sha512 => State::Sha512(Sha512::new()),
        };
        Self {
            algorithm,
            state,
            bytes_fed: 0,
        }
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    pub fn update(&mut self, data: &[u8]) {
        match &mut self.state {
            State::Crc32(h) => h.update(data),
            State::Md5(h) => h.consume(data),
            State::Sha256(h) => h.update(data),
            State::Sha512(h) => h.update(data),
        }
        self.bytes_fed += data.len() as u64;
    }

    /// Total bytes fed so far
    pub fn bytes_fed(&self) -> u64 {
        self.bytes_fed
    }

    /// Consumes the accumulator and returns the lower-case hex digest
    pub fn finalize(self) -> String {
        match self.state {
            State::Crc32(h) => format!("{:08x}", h.finalize()),
            State::Md5(h) => format!("{:x}", h.compute()),
            State::Sha256(h) => hex::encode(h.finalize()),
            State::Sha512(h) => hex::encode(h.finalize()),
        }
    }
}

/// One-shot digest of an in-memory buffer
pub fn digest_hex(algorithm: DigestAlgorithm, data: &[u8]) -> String {
    let mut acc = DigestAccumulator::new(algorithm);
    acc.update(data);
    acc.finalize()
}

/// Case-insensitive hex digest comparison
pub fn digests_equal(expected: &str, actual: &str) -> bool {
    expected.trim().eq_ignore_ascii_case(actual.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vectors() {
        assert_eq!(digest_hex(DigestAlgorithm::Crc32, b"123456789"), "cbf43926");
        assert_eq!(
            digest_hex(DigestAlgorithm::Md5, b"abc"),
            "900150983cd24fb0d6963f7d28e17f72"
        );
        assert_eq!(
            digest_hex(DigestAlgorithm::Md5, b""),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
        assert_eq!(
            digest_hex(DigestAlgorithm::Sha256, b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_chunked_equals_one_shot() {
        let data: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        for algorithm in DigestAlgorithm::ALL {
            let mut acc = DigestAccumulator::new(algorithm);
            for chunk in data.chunks(777) {
                acc.update(chunk);
            }
            assert_eq!(acc.bytes_fed(), 10_000);
            assert_eq!(acc.finalize(), digest_hex(algorithm, &data));
        }
    }

    #[test]
    fn test_from_hex_len() {
        assert_eq!(DigestAlgorithm::from_hex_len(8), Some(DigestAlgorithm::Crc32));
        assert_eq!(DigestAlgorithm::from_hex_len(64), Some(DigestAlgorithm::Sha256));
        assert_eq!(DigestAlgorithm::from_hex_len(128), Some(DigestAlgorithm::Sha512));
        assert_eq!(DigestAlgorithm::from_hex_len(32), Some(DigestAlgorithm::Md5));
        assert_eq!(DigestAlgorithm::from_hex_len(40), None);
    }

    #[test]
    fn test_parse_algorithm_names() {
        assert_eq!("MD5".parse::<DigestAlgorithm>(), Ok(DigestAlgorithm::Md5));
        assert_eq!("sha-256".parse::<DigestAlgorithm>(), Ok(DigestAlgorithm::Sha256));
        assert!("sha1".parse::<DigestAlgorithm>().is_err());
    }

    #[test]
    fn test_digests_equal_ignores_case() {
        assert!(digests_equal("CBF43926", "cbf43926"));
        assert!(!digests_equal("cbf43927", "cbf43926"));
    }

    #[test]
    fn test_digest_length_matches_algorithm() {
        for algorithm in DigestAlgorithm::ALL {
            assert_eq!(digest_hex(algorithm, b"").len(), algorithm.hex_len());
        }
    }
}
