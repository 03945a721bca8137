//! Boundary tracing on the pixel grid.
//!
//! Every component pixel contributes a directed unit edge on each side that
//! faces a pixel outside the component: top edges run right, right edges run
//! down, bottom edges run left, left edges run up. Following these edges
//! yields clockwise outer loops and counter-clockwise hole loops (y down).

use std::collections::HashMap;

use crate::api::{alloc_filled, Result};
use crate::quantize::neighbors4;

pub(crate) type GridPoint = (i32, i32);

/// A 4-connected run of one label.
pub(crate) struct Component {
    pub label: u16,
    pub loops: Vec<Vec<GridPoint>>,
}

/// Label connected components and trace each one's boundary loops.
///
/// `present[i] == false` pixels belong to no component. Components are
/// returned in order of their first pixel.
pub(crate) fn trace_components(
    labels: &[u16],
    present: &[bool],
    width: usize,
    height: usize,
) -> Result<Vec<Component>> {
    let n = labels.len();
    let mut comp_of = alloc_filled(n, u32::MAX)?;
    let mut components: Vec<(u16, Vec<usize>)> = Vec::new();
    let mut stack = Vec::new();

    for start in 0..n {
        if !present[start] || comp_of[start] != u32::MAX {
            continue;
        }
        let id = components.len() as u32;
        let label = labels[start];
        let mut pixels = Vec::new();
        comp_of[start] = id;
        stack.push(start);
        while let Some(idx) = stack.pop() {
            pixels.push(idx);
            for nb in neighbors4(idx, width, height).into_iter().flatten() {
                if present[nb] && comp_of[nb] == u32::MAX && labels[nb] == label {
                    comp_of[nb] = id;
                    stack.push(nb);
                }
            }
        }
        components.push((label, pixels));
    }

    let mut out = Vec::with_capacity(components.len());
    for (id, (label, pixels)) in components.iter().enumerate() {
        let inside = |x: i64, y: i64| {
            x >= 0
                && y >= 0
                && (x as usize) < width
                && (y as usize) < height
                && comp_of[y as usize * width + x as usize] == id as u32
        };

        let mut edges: Vec<(GridPoint, GridPoint)> = Vec::new();
        for &idx in pixels {
            let (x, y) = ((idx % width) as i32, (idx / width) as i32);
            let (xi, yi) = (x as i64, y as i64);
            if !inside(xi, yi - 1) {
                edges.push(((x, y), (x + 1, y)));
            }
            if !inside(xi + 1, yi) {
                edges.push(((x + 1, y), (x + 1, y + 1)));
            }
            if !inside(xi, yi + 1) {
                edges.push(((x + 1, y + 1), (x, y + 1)));
            }
            if !inside(xi - 1, yi) {
                edges.push(((x, y + 1), (x, y)));
            }
        }

        out.push(Component {
            label: *label,
            loops: follow_loops(edges),
        });
    }
    Ok(out)
}

/// Chain directed edges into closed loops.
///
/// Where several edges leave one vertex (components touching themselves
/// diagonally) the lowest direction rank is taken first: right, down, left,
/// up. Returned loops do not repeat their first vertex.
fn follow_loops(mut edges: Vec<(GridPoint, GridPoint)>) -> Vec<Vec<GridPoint>> {
    // Row-major start order gives every loop a deterministic starting vertex.
    edges.sort_by(|a, b| {
        (a.0 .1, a.0 .0, direction_rank(a.0, a.1)).cmp(&(b.0 .1, b.0 .0, direction_rank(b.0, b.1)))
    });

    let mut starts: HashMap<GridPoint, Vec<usize>> = HashMap::new();
    for (i, e) in edges.iter().enumerate() {
        starts.entry(e.0).or_default().push(i);
    }

    let mut used = vec![false; edges.len()];
    let mut loops = Vec::new();
    for first in 0..edges.len() {
        if used[first] {
            continue;
        }
        let origin = edges[first].0;
        let mut ring = vec![origin];
        let mut current = first;
        loop {
            used[current] = true;
            let end = edges[current].1;
            if end == origin {
                break;
            }
            ring.push(end);
            let next = starts
                .get(&end)
                .and_then(|out| out.iter().copied().find(|&e| !used[e]));
            match next {
                Some(e) => current = e,
                // Unreachable for a well-formed boundary; drop the fragment.
                None => {
                    ring.clear();
                    break;
                }
            }
        }
        if ring.len() >= 4 {
            loops.push(ring);
        }
    }
    loops
}

fn direction_rank(from: GridPoint, to: GridPoint) -> u8 {
    match (to.0 - from.0, to.1 - from.1) {
        (1, 0) => 0,
        (0, 1) => 1,
        (-1, 0) => 2,
        _ => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_pixel_is_unit_square() {
        let comps = trace_components(&[0], &[true], 1, 1).unwrap();
        assert_eq!(comps.len(), 1);
        assert_eq!(comps[0].loops, vec![vec![(0, 0), (1, 0), (1, 1), (0, 1)]]);
    }

    #[test]
    fn test_ring_has_outer_loop_and_hole() {
        #[rustfmt::skip]
        let labels = [
            0, 0, 0,
            0, 1, 0,
            0, 0, 0,
        ];
        let comps = trace_components(&labels, &[true; 9], 3, 3).unwrap();
        assert_eq!(comps.len(), 2);
        assert_eq!(comps[0].label, 0);
        assert_eq!(comps[0].loops.len(), 2);
        assert_eq!(comps[1].label, 1);
        assert_eq!(comps[1].loops.len(), 1);
    }

    #[test]
    fn test_absent_pixels_are_not_traced() {
        let labels = [0, 0, 0, 0];
        let present = [true, false, false, true];
        let comps = trace_components(&labels, &present, 2, 2).unwrap();
        // Diagonal pixels are separate components
        assert_eq!(comps.len(), 2);
        assert!(comps.iter().all(|c| c.loops.len() == 1));
    }

    #[test]
    fn test_self_touching_component_closes_all_loops() {
        // The 0-component wraps around and touches itself diagonally at the
        // hole's corner.
        #[rustfmt::skip]
        let labels = [
            0, 0, 0, 0,
            0, 1, 0, 0,
            0, 0, 1, 0,
            0, 0, 0, 0,
        ];
        let comps = trace_components(&labels, &[true; 16], 4, 4).unwrap();
        let zero = &comps[0];
        let perimeter: usize = zero.loops.iter().map(Vec::len).sum();
        // 16 outer edges plus 8 edges around the two enclosed pixels
        assert_eq!(perimeter, 24);
    }
}
