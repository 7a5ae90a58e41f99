//! CRC-32 (IEEE 802.3, polynomial `0xEDB88320`, reflected), used for PNG chunk
//! integrity only. Wraps `crc32fast`'s table-driven (SIMD-accelerated where
//! available) implementation behind the running-hasher shape the rest of this
//! crate expects: `update(bytes)` folds a slice into a running state,
//! `finalize()` XORs with `0xFFFFFFFF` and returns the stored value.

/// A running CRC-32 computation over one or more byte slices.
#[derive(Debug, Default, Clone)]
pub struct Crc32 {
    hasher: crc32fast::Hasher,
}

impl Crc32 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold `bytes` into the running checksum.
    pub fn update(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// Finalize the checksum, consuming the hasher.
    pub fn finalize(self) -> u32 {
        self.hasher.finalize()
    }
}

/// One-shot CRC-32 over a single byte slice.
pub fn crc32(bytes: &[u8]) -> u32 {
    let mut hasher = Crc32::new();
    hasher.update(bytes);
    hasher.finalize()
}

/// CRC-32 over `chunk_type ‖ data`, as required for chunk framing (§4.2).
pub fn crc32_chunk(chunk_type: &[u8; 4], data: &[u8]) -> u32 {
    let mut hasher = Crc32::new();
    hasher.update(chunk_type);
    hasher.update(data);
    hasher.finalize()
}
