//! Content fingerprint for stitch rasters.
//!
//! 64-bit FNV-1a over a dimension tag, a selection tag and every pixel's
//! color key in raster order. The hash depends only on those inputs, so it
//! can key caches of anything derived from the raster.

use std::fmt;

use serde::{Serialize, Serializer};

use super::raster::StitchRaster;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Incremental FNV-1a hasher.
#[derive(Debug, Clone, Copy)]
pub struct LockHasher {
    state: u64,
}

impl Default for LockHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl LockHasher {
    pub fn new() -> Self {
        Self {
            state: FNV_OFFSET_BASIS,
        }
    }

    #[inline]
    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(FNV_PRIME);
        }
    }

    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.write(s.as_bytes());
    }

    pub fn finish(&self) -> LockHash {
        LockHash(self.state)
    }
}

/// Fingerprint of `(dimensions, selection identity, per-pixel colors)`.
///
/// Displays and serializes as 16 lowercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LockHash(pub u64);

impl fmt::Display for LockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl Serialize for LockHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Fingerprint a raster under a selection identity.
///
/// Each pixel contributes `CODE|HEX;` using its normalized color key, so
/// colors that differ only in case or surrounding whitespace hash alike.
pub fn lock_hash(raster: &StitchRaster, selection_id: &str) -> LockHash {
    let mut hasher = LockHasher::new();
    hasher.write_str(&format!("size:{}x{};", raster.width(), raster.height()));
    hasher.write_str("sel:");
    hasher.write_str(selection_id);
    hasher.write(b";");

    let keys: Vec<Vec<u8>> = raster
        .colors()
        .iter()
        .map(|c| {
            let mut k = c.key().into_bytes();
            k.push(b';');
            k
        })
        .collect();
    for &cell in raster.cells() {
        hasher.write(&keys[cell as usize]);
    }
    hasher.finish()
}
