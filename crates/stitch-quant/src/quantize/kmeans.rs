//! Deterministic k-means in OKLab.
//!
//! Training runs on a strided subsample so its cost does not grow with the
//! image. Seeding is fully deterministic: the median-lightness sample first,
//! then repeated farthest-point picks. Identical inputs therefore always
//! produce identical centers.

use crate::color::Oklab;

/// Upper bound on the number of training samples.
pub const MAX_TRAINING_SAMPLES: usize = 9000;

/// Upper bound on Lloyd iterations.
pub const MAX_ITERATIONS: usize = 10;

/// Samples closer than this (squared, weighted) to every chosen center are
/// treated as duplicates during seeding. Far below one 8-bit sRGB step, it
/// only absorbs float noise from the smoothing filter.
const DUPLICATE_DISTANCE_SQ: f32 = 1e-9;

/// Every `stride`-th candidate, with the stride chosen so that at most
/// [`MAX_TRAINING_SAMPLES`] survive.
pub(crate) fn subsample(lab: &[Oklab], candidates: &[usize]) -> Vec<Oklab> {
    let stride = candidates.len().div_ceil(MAX_TRAINING_SAMPLES).max(1);
    candidates.iter().step_by(stride).map(|&i| lab[i]).collect()
}

/// Index and weighted squared distance of the nearest center.
///
/// Ties resolve to the lower index.
#[inline]
pub(crate) fn nearest_center(centers: &[Oklab], color: Oklab) -> (usize, f32) {
    let mut best = 0;
    let mut best_dist = f32::INFINITY;
    for (i, c) in centers.iter().enumerate() {
        let d = color.perceptual_distance_sq(*c);
        if d < best_dist {
            best_dist = d;
            best = i;
        }
    }
    (best, best_dist)
}

/// Choose up to `k` initial centers.
///
/// Stops early once every remaining sample coincides with a chosen center, so
/// an image with fewer distinct colors than `k` yields fewer centers.
pub(crate) fn seed_centers(samples: &[Oklab], k: usize) -> Vec<Oklab> {
    if samples.is_empty() || k == 0 {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..samples.len()).collect();
    order.sort_by(|&a, &b| samples[a].l.total_cmp(&samples[b].l).then(a.cmp(&b)));
    let first = samples[order[order.len() / 2]];

    let mut centers = Vec::with_capacity(k.min(samples.len()));
    centers.push(first);
    let mut min_dist: Vec<f32> = samples
        .iter()
        .map(|s| s.perceptual_distance_sq(first))
        .collect();

    while centers.len() < k {
        let mut far = 0;
        let mut far_dist = 0.0f32;
        for (i, &d) in min_dist.iter().enumerate() {
            if d > far_dist {
                far_dist = d;
                far = i;
            }
        }
        if far_dist <= DUPLICATE_DISTANCE_SQ {
            break;
        }
        let next = samples[far];
        centers.push(next);
        for (d, s) in min_dist.iter_mut().zip(samples) {
            *d = d.min(s.perceptual_distance_sq(next));
        }
    }
    centers
}

/// Seed and refine centers with Lloyd's algorithm.
///
/// Returns the centers and the number of iterations run.
pub(crate) fn train(samples: &[Oklab], k: usize) -> (Vec<Oklab>, usize) {
    let mut centers = seed_centers(samples, k);
    if centers.is_empty() {
        return (centers, 0);
    }

    let mut assignment = vec![usize::MAX; samples.len()];
    let mut iterations = 0;
    while iterations < MAX_ITERATIONS {
        iterations += 1;

        let mut changed = 0usize;
        for (slot, s) in assignment.iter_mut().zip(samples) {
            let (c, _) = nearest_center(&centers, *s);
            if *slot != c {
                *slot = c;
                changed += 1;
            }
        }
        if changed == 0 {
            break;
        }

        let mut sums = vec![[0.0f64; 3]; centers.len()];
        let mut counts = vec![0usize; centers.len()];
        for (&c, s) in assignment.iter().zip(samples) {
            sums[c][0] += s.l as f64;
            sums[c][1] += s.a as f64;
            sums[c][2] += s.b as f64;
            counts[c] += 1;
        }
        for (center, (sum, &count)) in centers.iter_mut().zip(sums.iter().zip(&counts)) {
            // An empty cluster keeps its previous position.
            if count > 0 {
                let n = count as f64;
                *center = Oklab::new(
                    (sum[0] / n) as f32,
                    (sum[1] / n) as f32,
                    (sum[2] / n) as f32,
                );
            }
        }
    }

    tracing::trace!(k = centers.len(), iterations, "lloyd converged");
    (centers, iterations)
}
