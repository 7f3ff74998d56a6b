//! Verify options DTO

use crate::domain::services::DigestAlgorithm;

/// Default number of bytes streamed into the digest per step
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Options controlling a verification run
#[derive(Debug, Clone)]
pub struct VerifyOptions {
    /// Bytes read per digest step (affects peak memory, not results)
    pub chunk_size: usize,
    /// Whether fixtures in a suite run on a worker pool
    pub parallel: bool,
    /// Worker count for parallel runs
    pub thread_count: usize,
    /// Read the next chunk on a producer thread while hashing the current one
    pub pipelined: bool,
    /// Forces a digest algorithm instead of inferring it from the expected digest
    pub digest_algorithm: Option<DigestAlgorithm>,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            parallel: true,
            thread_count: std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4),
            pipelined: true,
            digest_algorithm: None,
        }
    }
}

impl VerifyOptions {
    /// Sets the streaming chunk size; zero is clamped to one byte
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.thread_count = threads.max(1);
        self
    }

    pub fn with_digest_algorithm(mut self, algorithm: DigestAlgorithm) -> Self {
        self.digest_algorithm = Some(algorithm);
        self
    }

    /// Disables the suite worker pool
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Disables the read-ahead producer thread
    pub fn unpipelined(mut self) -> Self {
        self.pipelined = false;
        self
    }

    /// Sectors per digest step for a given sector size
    ///
    /// Always at least one sector, so a sector larger than the chunk size is
    /// still streamed one at a time.
    pub fn sectors_per_chunk(&self, sector_size: u32) -> u64 {
        if sector_size == 0 {
            return 1;
        }
        ((self.chunk_size as u64) / sector_size as u64).max(1)
    }

    /// Algorithm for an expected digest: the override, or one inferred from
    /// the digest's length
    pub fn algorithm_for(&self, expected_digest: &str) -> Option<DigestAlgorithm> {
        self.digest_algorithm
            .or_else(|| DigestAlgorithm::from_hex_len(expected_digest.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sectors_per_chunk() {
        let options = VerifyOptions::default().with_chunk_size(4096);
        assert_eq!(options.sectors_per_chunk(512), 8);
        assert_eq!(options.sectors_per_chunk(2048), 2);
        assert_eq!(options.sectors_per_chunk(8192), 1);
    }

    #[test]
    fn test_algorithm_override_wins() {
        let options = VerifyOptions::default().with_digest_algorithm(DigestAlgorithm::Crc32);
        assert_eq!(options.algorithm_for(&"0".repeat(64)), Some(DigestAlgorithm::Crc32));
    }

    #[test]
    fn test_algorithm_inferred_from_length() {
        let options = VerifyOptions::default();
        assert_eq!(options.algorithm_for(&"0".repeat(64)), Some(DigestAlgorithm::Sha256));
        assert_eq!(options.algorithm_for("abc"), None);
    }
}
