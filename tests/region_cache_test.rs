//! Region graph cache behavior under concurrent callers.

mod common;

use common::fixtures;
use std::sync::Arc;
use stitch_quant::{lock_hash, RegionGraphBuilder};
use stitchgrid::services::{RegionGraphCache, RegionGraphTracker};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_hash_is_built_once() {
    let cache = RegionGraphCache::new(16);
    let raster = Arc::new(fixtures::random_raster(7, 64, 48, 5));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let cache = cache.clone();
        let raster = raster.clone();
        handles.push(tokio::spawn(async move {
            cache.get_or_build(raster, "all:64x48").await.unwrap()
        }));
    }
    let mut graphs = Vec::new();
    for handle in handles {
        graphs.push(handle.await.unwrap());
    }

    assert!(graphs.iter().all(|g| Arc::ptr_eq(g, &graphs[0])));
    let stats = cache.stats().await;
    assert_eq!(stats.builds, 1);
    assert_eq!(stats.hits + stats.joins, 7);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_different_hashes_build_independently() {
    let cache = RegionGraphCache::new(16);
    let a = Arc::new(fixtures::random_raster(1, 40, 30, 4));
    let b = Arc::new(fixtures::random_raster(2, 40, 30, 4));

    let (ga, gb) = tokio::join!(
        cache.get_or_build(a.clone(), "sel"),
        cache.get_or_build(b.clone(), "sel")
    );
    let (ga, gb) = (ga.unwrap(), gb.unwrap());

    assert_ne!(ga.lock_hash, gb.lock_hash);
    assert_eq!(cache.stats().await.builds, 2);
    common::assert_consistent_graph(&ga, &a);
    common::assert_consistent_graph(&gb, &b);
}

#[tokio::test]
async fn test_cached_graph_matches_direct_build() {
    let cache = RegionGraphCache::new(4);
    let raster = Arc::new(fixtures::random_raster(11, 20, 20, 3));
    let cached = cache.get_or_build(raster.clone(), "mask:x").await.unwrap();

    let legend: Vec<_> = raster.legend().into_iter().map(|e| e.color).collect();
    let direct = RegionGraphBuilder::new()
        .legend(&legend)
        .selection_id("mask:x")
        .build(&raster)
        .unwrap();
    assert_eq!(*cached, direct);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tracker_keeps_only_latest_request() {
    let cache = RegionGraphCache::new(4);
    let tracker = Arc::new(RegionGraphTracker::new());
    let first = Arc::new(fixtures::random_raster(3, 96, 96, 6));
    let second = Arc::new(fixtures::random_raster(4, 8, 8, 2));

    // Request the slow graph, then switch to the small one before it lands
    tracker.request(lock_hash(&first, "sel"));
    let slow = {
        let cache = cache.clone();
        let first = first.clone();
        tokio::spawn(async move { cache.get_or_build(first, "sel").await.unwrap() })
    };
    let latest = tracker.load(&cache, second.clone(), "sel").await.unwrap();
    let stale = slow.await.unwrap();

    assert!(latest.is_some());
    assert!(tracker.accept(stale).is_none());
    assert_eq!(tracker.current(), Some(lock_hash(&second, "sel")));
    // Both builds completed and were cached
    assert!(cache.get(lock_hash(&first, "sel")).await.is_some());
    assert!(cache.get(lock_hash(&second, "sel")).await.is_some());
}
