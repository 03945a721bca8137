//! Quantization result cache with LRU eviction.
//!
//! Entries are keyed by a SHA-256 digest over everything a quantization run
//! reads: image size and pixels, the normalized config, and the training
//! mask. Two requests with equal keys produce equal results.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use stitch_quant::{NormalizedImage, ProcessingConfig, QuantizeResult, SelectionMask};

/// LRU cache of quantization results.
pub struct QuantizeCache {
    cache: HashMap<String, Arc<QuantizeResult>>,
    /// Keys ordered by last use (oldest first)
    insertion_order: Vec<String>,
    max_entries: usize,
}

impl QuantizeCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            cache: HashMap::new(),
            insertion_order: Vec::new(),
            max_entries,
        }
    }

    /// Get a cached result and mark it recently used
    pub fn get(&mut self, key: &str) -> Option<Arc<QuantizeResult>> {
        let entry = self.cache.get(key)?.clone();

        self.insertion_order.retain(|k| k != key);
        self.insertion_order.push(key.to_string());

        Some(entry)
    }

    /// Store a result. A zero capacity stores nothing.
    pub fn store(&mut self, key: String, result: Arc<QuantizeResult>) {
        if self.max_entries == 0 {
            return;
        }
        if self.cache.contains_key(&key) {
            self.insertion_order.retain(|k| k != &key);
        }

        while self.cache.len() >= self.max_entries && !self.insertion_order.is_empty() {
            let oldest_key = self.insertion_order.remove(0);
            self.cache.remove(&oldest_key);
            tracing::debug!(
                key = %oldest_key,
                cache_size = self.cache.len(),
                "Quantize cache: evicted oldest entry"
            );
        }

        self.cache.insert(key.clone(), result);
        self.insertion_order.push(key);
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

/// Compute a cache key for one quantization request.
///
/// The config enters in normalized form, so configs that clamp to the same
/// settings share a key.
pub fn compute_cache_key(
    image: &NormalizedImage,
    config: &ProcessingConfig,
    selection: Option<&SelectionMask>,
) -> String {
    let mut hasher = Sha256::new();

    hasher.update(image.width().to_le_bytes());
    hasher.update(image.height().to_le_bytes());
    hasher.update(b"|rgba:");
    hasher.update(image.rgba());

    let settings = config.normalized();
    hasher.update(b"|config:");
    hasher.update((settings.color_count as u64).to_le_bytes());
    hasher.update([settings.dither_mode as u8]);
    hasher.update(settings.smoothing_amount.to_le_bytes());
    hasher.update(settings.simplify_amount.to_le_bytes());
    hasher.update((settings.min_region_size as u64).to_le_bytes());

    if let Some(mask) = selection {
        hasher.update(b"|mask:");
        hasher.update(mask.width().to_le_bytes());
        hasher.update(mask.height().to_le_bytes());
        hasher.update(mask.data());
    }

    hex::encode(hasher.finalize())
}
