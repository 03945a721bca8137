//! Region graph cache keyed by lock hash.
//!
//! Finished graphs are kept in a bounded LRU. A request for a hash that is
//! still being built joins the running build instead of starting another;
//! requests for other hashes run independently. Builds run on the blocking
//! pool.

use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::Arc;
use stitch_quant::{
    lock_hash, LockHash, RegionGraph, RegionGraphBuilder, StitchColor, StitchRaster,
};
use tokio::sync::Mutex;

use crate::error::CacheError;

type BuildFuture = Shared<BoxFuture<'static, Result<Arc<RegionGraph>, CacheError>>>;

/// Finished graphs, least recently used first
struct GraphLru {
    graphs: HashMap<LockHash, Arc<RegionGraph>>,
    insertion_order: Vec<LockHash>,
    max_entries: usize,
}

impl GraphLru {
    fn new(max_entries: usize) -> Self {
        Self {
            graphs: HashMap::new(),
            insertion_order: Vec::new(),
            max_entries,
        }
    }

    fn get(&mut self, key: LockHash) -> Option<Arc<RegionGraph>> {
        let graph = self.graphs.get(&key)?.clone();
        self.insertion_order.retain(|k| *k != key);
        self.insertion_order.push(key);
        Some(graph)
    }

    fn store(&mut self, key: LockHash, graph: Arc<RegionGraph>) {
        if self.max_entries == 0 {
            return;
        }
        if self.graphs.contains_key(&key) {
            self.insertion_order.retain(|k| *k != key);
        }
        while self.graphs.len() >= self.max_entries && !self.insertion_order.is_empty() {
            let oldest = self.insertion_order.remove(0);
            self.graphs.remove(&oldest);
            tracing::debug!(
                lock_hash = %oldest,
                cache_size = self.graphs.len(),
                "Region cache: evicted oldest graph"
            );
        }
        self.graphs.insert(key, graph);
        self.insertion_order.push(key);
    }
}

struct CacheState {
    lru: GraphLru,
    in_flight: HashMap<LockHash, BuildFuture>,
}

/// Counters for observing cache behavior
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub joins: u64,
    pub builds: u64,
}

/// Bounded region graph cache with in-flight deduplication.
///
/// Cloning is cheap and clones share one cache.
#[derive(Clone)]
pub struct RegionGraphCache {
    state: Arc<Mutex<CacheState>>,
    stats: Arc<Mutex<CacheStats>>,
}

impl RegionGraphCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(CacheState {
                lru: GraphLru::new(capacity),
                in_flight: HashMap::new(),
            })),
            stats: Arc::new(Mutex::new(CacheStats::default())),
        }
    }

    /// Return the graph for this raster and selection, building it if needed.
    ///
    /// The raster's own legend fixes the color order, so the graph is a pure
    /// function of the lock hash.
    pub async fn get_or_build(
        &self,
        raster: Arc<StitchRaster>,
        selection_id: &str,
    ) -> Result<Arc<RegionGraph>, CacheError> {
        let key = lock_hash(&raster, selection_id);

        let build = {
            let mut state = self.state.lock().await;
            if let Some(graph) = state.lru.get(key) {
                tracing::debug!(lock_hash = %key, "Region cache hit");
                self.stats.lock().await.hits += 1;
                return Ok(graph);
            }
            let running = state.in_flight.get(&key).cloned();
            if let Some(running) = running {
                tracing::debug!(lock_hash = %key, "Region cache: joining in-flight build");
                self.stats.lock().await.joins += 1;
                running
            } else {
                tracing::debug!(lock_hash = %key, "Region cache miss, building");
                self.stats.lock().await.builds += 1;
                let build =
                    spawn_build(self.state.clone(), key, raster, selection_id.to_string());
                state.in_flight.insert(key, build.clone());
                build
            }
        };

        build.await
    }

    /// Cached graph for a hash, without building
    pub async fn get(&self, key: LockHash) -> Option<Arc<RegionGraph>> {
        self.state.lock().await.lru.get(key)
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.lru.graphs.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn stats(&self) -> CacheStats {
        *self.stats.lock().await
    }
}

/// Start a build on the runtime. The task itself retires the in-flight
/// entry and stores the graph, so it completes even if every caller drops.
fn spawn_build(
    state: Arc<Mutex<CacheState>>,
    key: LockHash,
    raster: Arc<StitchRaster>,
    selection_id: String,
) -> BuildFuture {
    let handle = tokio::spawn(async move {
        let result = build_graph(raster, selection_id).await;
        let mut state = state.lock().await;
        state.in_flight.remove(&key);
        match &result {
            Ok(graph) => state.lru.store(key, graph.clone()),
            Err(e) => tracing::warn!(lock_hash = %key, %e, "Region graph build failed"),
        }
        result
    });
    async move {
        handle
            .await
            .map_err(|e| CacheError::Worker(e.to_string()))?
    }
    .boxed()
    .shared()
}

async fn build_graph(
    raster: Arc<StitchRaster>,
    selection_id: String,
) -> Result<Arc<RegionGraph>, CacheError> {
    let graph = tokio::task::spawn_blocking(move || {
        let legend: Vec<StitchColor> = raster.legend().into_iter().map(|e| e.color).collect();
        RegionGraphBuilder::new()
            .legend(&legend)
            .selection_id(&selection_id)
            .build(&raster)
    })
    .await
    .map_err(|e| CacheError::Worker(e.to_string()))??;
    Ok(Arc::new(graph))
}

/// Tracks which lock hash a view currently wants.
///
/// Results that arrive for any other hash are stale and dropped. Running
/// builds are never cancelled; their results still land in the cache.
#[derive(Debug, Default)]
pub struct RegionGraphTracker {
    current: std::sync::Mutex<Option<LockHash>>,
}

impl RegionGraphTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` as the hash the view wants now
    pub fn request(&self, key: LockHash) {
        if let Ok(mut current) = self.current.lock() {
            *current = Some(key);
        }
    }

    pub fn current(&self) -> Option<LockHash> {
        self.current.lock().ok().and_then(|c| *c)
    }

    /// Pass a finished graph through only if it is still current
    pub fn accept(&self, graph: Arc<RegionGraph>) -> Option<Arc<RegionGraph>> {
        let current = self.current();
        if current == Some(graph.lock_hash) {
            Some(graph)
        } else {
            tracing::debug!(
                lock_hash = %graph.lock_hash,
                current = ?current.map(|c| c.to_string()),
                "Discarding stale region graph"
            );
            None
        }
    }

    /// Request `raster`'s graph and apply it only if nothing newer was
    /// requested while it was built.
    pub async fn load(
        &self,
        cache: &RegionGraphCache,
        raster: Arc<StitchRaster>,
        selection_id: &str,
    ) -> Result<Option<Arc<RegionGraph>>, CacheError> {
        self.request(lock_hash(&raster, selection_id));
        let graph = cache.get_or_build(raster, selection_id).await?;
        Ok(self.accept(graph))
    }
}
