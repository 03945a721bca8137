//! Label cleanup: small-region elimination and majority smoothing.

use std::collections::BTreeMap;

use crate::api::{alloc_filled, Result};
use crate::color::Oklab;

/// Merge every 4-connected component smaller than `min_size` into the
/// neighboring label it shares the most border with.
///
/// Ties on border length go to the neighbor whose center is perceptually
/// closest to the component's own center, then to the lower label. Components
/// with no differently-labelled neighbor are left alone. Returns the number of
/// components merged.
pub(crate) fn remove_small_regions(
    labels: &mut [u16],
    width: usize,
    height: usize,
    centers: &[Oklab],
    min_size: usize,
) -> Result<usize> {
    if min_size <= 1 || labels.is_empty() {
        return Ok(0);
    }

    let mut visited = alloc_filled(labels.len(), false)?;
    let mut stack: Vec<usize> = Vec::new();
    let mut region: Vec<usize> = Vec::new();
    let mut merged = 0usize;

    for start in 0..labels.len() {
        if visited[start] {
            continue;
        }
        let label = labels[start];
        region.clear();
        stack.clear();
        stack.push(start);
        visited[start] = true;

        while let Some(idx) = stack.pop() {
            region.push(idx);
            for n in neighbors4(idx, width, height).into_iter().flatten() {
                if !visited[n] && labels[n] == label {
                    visited[n] = true;
                    stack.push(n);
                }
            }
        }

        if region.len() >= min_size {
            continue;
        }

        let mut border: BTreeMap<u16, usize> = BTreeMap::new();
        for &idx in &region {
            for n in neighbors4(idx, width, height).into_iter().flatten() {
                if labels[n] != label {
                    *border.entry(labels[n]).or_insert(0) += 1;
                }
            }
        }

        let own = centers[label as usize];
        let target = border
            .iter()
            .map(|(&candidate, &count)| {
                let d = own.perceptual_distance_sq(centers[candidate as usize]);
                (candidate, count, d)
            })
            // BTreeMap iterates in ascending label order, so `min_by` keeps
            // the lowest label among exact ties.
            .min_by(|a, b| b.1.cmp(&a.1).then(a.2.total_cmp(&b.2)));

        if let Some((target, _, _)) = target {
            for &idx in &region {
                labels[idx] = target;
            }
            merged += 1;
        }
    }

    Ok(merged)
}

/// Majority-vote label smoothing with bounded perceptual drift.
///
/// A pixel switches to the most frequent label of its 3×3 neighborhood only
/// when that label's center is no farther from the pixel's color than its
/// current center plus `allow_error`. Each pass reads the previous pass's
/// labels. Returns the number of pixels switched over all passes.
pub(crate) fn smooth_labels(
    labels: &mut Vec<u16>,
    width: usize,
    height: usize,
    lab: &[Oklab],
    centers: &[Oklab],
    passes: usize,
    allow_error: f32,
) -> Result<usize> {
    let mut switched = 0usize;
    for _ in 0..passes {
        let src = labels.clone();
        let mut votes: Vec<(u16, u8)> = Vec::with_capacity(9);

        for y in 0..height {
            for x in 0..width {
                let i = y * width + x;
                let own = src[i];

                votes.clear();
                for ny in y.saturating_sub(1)..=(y + 1).min(height - 1) {
                    for nx in x.saturating_sub(1)..=(x + 1).min(width - 1) {
                        let l = src[ny * width + nx];
                        match votes.iter_mut().find(|(v, _)| *v == l) {
                            Some((_, count)) => *count += 1,
                            None => votes.push((l, 1)),
                        }
                    }
                }

                let own_count = votes
                    .iter()
                    .find(|(v, _)| *v == own)
                    .map_or(0, |(_, c)| *c);
                let Some(&(majority, majority_count)) = votes
                    .iter()
                    .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
                else {
                    continue;
                };
                if majority == own || majority_count <= own_count {
                    continue;
                }

                let color = lab[i];
                let d_majority =
                    color.perceptual_distance_sq(centers[majority as usize]).sqrt();
                let d_own = color.perceptual_distance_sq(centers[own as usize]).sqrt();
                if d_majority <= d_own + allow_error {
                    labels[i] = majority;
                    switched += 1;
                }
            }
        }
    }
    Ok(switched)
}

#[inline]
pub(crate) fn neighbors4(idx: usize, width: usize, height: usize) -> [Option<usize>; 4] {
    let x = idx % width;
    let y = idx / width;
    [
        (x > 0).then(|| idx - 1),
        (x + 1 < width).then(|| idx + 1),
        (y > 0).then(|| idx - width),
        (y + 1 < height).then(|| idx + width),
    ]
}
