//! Trace the outline of a set of raster cells into polygon rings.
//!
//! Every cell side that borders a cell outside the set becomes a directed
//! boundary edge, oriented with the set on its left in a y-up frame. Edges
//! are chained head to tail into closed rings, turning right wherever two
//! edges leave a corner. Counter-clockwise rings are exteriors, clockwise
//! rings are holes. Each grid segment belongs to at most one ring, so ring
//! ownership is decided by testing the midpoint of a hole's first edge
//! against the candidate exteriors.
use std::collections::HashMap;

use crate::geometry::{ring_contains, ring_signed_area, Point, Polygon};

/// Grid placement used to convert corner indices into projected coordinates.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GridFrame {
    pub width: usize,
    pub height: usize,
    pub origin_x: f64,
    pub origin_y: f64,
    pub cell_x: f64,
    pub cell_y: f64,
}

/// Grid corner `(col, row)`; row grows downward.
type Corner = (usize, usize);

/// Trace the cells flagged in `mask` (row-major, `frame.width × frame.height`).
pub(crate) fn trace(mask: &[bool], frame: &GridFrame) -> Vec<Polygon> {
    let (w, h) = (frame.width, frame.height);
    let inside = |r: isize, c: isize| -> bool {
        r >= 0 && c >= 0 && (r as usize) < h && (c as usize) < w && mask[r as usize * w + c as usize]
    };

    // Directed edges with the set on their left, in row-major scan order.
    let mut edges: Vec<(Corner, Corner)> = Vec::new();
    for r in 0..h {
        for c in 0..w {
            if !mask[r * w + c] {
                continue;
            }
            let (ri, ci) = (r as isize, c as isize);
            let (tl, tr, br, bl) = ((c, r), (c + 1, r), (c + 1, r + 1), (c, r + 1));
            if !inside(ri + 1, ci) {
                edges.push((bl, br));
            }
            if !inside(ri, ci + 1) {
                edges.push((br, tr));
            }
            if !inside(ri - 1, ci) {
                edges.push((tr, tl));
            }
            if !inside(ri, ci - 1) {
                edges.push((tl, bl));
            }
        }
    }

    let mut outgoing: HashMap<Corner, Vec<usize>> = HashMap::new();
    for (i, &(from, _)) in edges.iter().enumerate() {
        outgoing.entry(from).or_default().push(i);
    }

    // A saddle corner has two edges leaving it. Always taking the rightmost
    // turn joins the diagonal cells there, so every ring is simple and a
    // hole touching its exterior at a saddle stays a separate ring.
    let successor: Vec<Option<usize>> = edges
        .iter()
        .map(|&(from, to)| {
            let d = heading(from, to);
            outgoing.get(&to).and_then(|next| {
                next.iter().copied().min_by_key(|&j| {
                    let e = heading(edges[j].0, edges[j].1);
                    d.0 * e.1 - d.1 * e.0
                })
            })
        })
        .collect();

    let mut visited = vec![false; edges.len()];
    let mut rings: Vec<Vec<Corner>> = Vec::new();
    for first in 0..edges.len() {
        if visited[first] {
            continue;
        }
        let mut ring = Vec::new();
        let mut at = Some(first);
        while let Some(i) = at {
            if visited[i] {
                break;
            }
            visited[i] = true;
            ring.push(edges[i].0);
            at = successor[i];
        }
        rings.push(ring);
    }

    assemble(rings.iter().map(|r| to_world(&simplify(r), frame)).collect())
}

/// Unit step from `a` to `b` in a y-up frame.
fn heading(a: Corner, b: Corner) -> (isize, isize) {
    (
        (b.0 as isize - a.0 as isize).signum(),
        (a.1 as isize - b.1 as isize).signum(),
    )
}

/// Drop corners where the ring continues straight on.
fn simplify(ring: &[Corner]) -> Vec<Corner> {
    let n = ring.len();
    if n < 4 {
        return ring.to_vec();
    }
    let dir = |a: Corner, b: Corner| {
        (
            (b.0 as isize - a.0 as isize).signum(),
            (b.1 as isize - a.1 as isize).signum(),
        )
    };
    (0..n)
        .filter(|&i| {
            let prev = ring[(i + n - 1) % n];
            let next = ring[(i + 1) % n];
            dir(prev, ring[i]) != dir(ring[i], next)
        })
        .map(|i| ring[i])
        .collect()
}

/// Corners to projected coordinates, closing the ring.
fn to_world(ring: &[Corner], frame: &GridFrame) -> Vec<Point> {
    let mut pts: Vec<Point> = ring
        .iter()
        .map(|&(c, r)| {
            Point::new(
                frame.origin_x + c as f64 * frame.cell_x,
                frame.origin_y - r as f64 * frame.cell_y,
            )
        })
        .collect();
    if let Some(&first) = pts.first() {
        pts.push(first);
    }
    pts
}

/// Group rings into polygons: exteriors are counter-clockwise, each hole
/// goes to the smallest exterior containing it.
fn assemble(rings: Vec<Vec<Point>>) -> Vec<Polygon> {
    let (exteriors, holes): (Vec<_>, Vec<_>) = rings.into_iter().partition(|r| ring_signed_area(r) > 0.0);
    let mut polygons: Vec<Polygon> = exteriors.into_iter().map(Polygon::new).collect();
    let areas: Vec<f64> = polygons.iter().map(|p| ring_signed_area(&p.exterior)).collect();

    for hole in holes {
        let probe = Point::new((hole[0].x + hole[1].x) / 2.0, (hole[0].y + hole[1].y) / 2.0);
        let owner = polygons
            .iter()
            .enumerate()
            .filter(|(_, p)| ring_contains(&p.exterior, probe))
            .min_by(|a, b| areas[a.0].total_cmp(&areas[b.0]))
            .map(|(i, _)| i);
        if let Some(i) = owner {
            polygons[i].holes.push(hole);
        }
    }
    polygons
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(width: usize, height: usize) -> GridFrame {
        GridFrame { width, height, origin_x: 0.0, origin_y: height as f64, cell_x: 1.0, cell_y: 1.0 }
    }

    fn mask_from(rows: &[&str]) -> Vec<bool> {
        rows.iter().flat_map(|r| r.chars().map(|ch| ch == '#')).collect()
    }

    #[test]
    fn single_block_traces_to_rectangle() {
        let mask = mask_from(&["....", ".##.", ".##.", "...."]);
        let polys = trace(&mask, &frame(4, 4));
        assert_eq!(polys.len(), 1);
        // Four corners plus the closing point.
        assert_eq!(polys[0].exterior.len(), 5);
        assert!((polys[0].area() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn ring_of_cells_has_one_hole() {
        let mask = mask_from(&["###", "#.#", "###"]);
        let polys = trace(&mask, &frame(3, 3));
        assert_eq!(polys.len(), 1);
        assert_eq!(polys[0].holes.len(), 1);
        assert!((polys[0].area() - 8.0).abs() < 1e-12);
        assert!(!polys[0].contains(Point::new(1.5, 1.5)));
        assert!(polys[0].contains(Point::new(0.5, 0.5)));
    }

    #[test]
    fn separate_blobs_trace_separately() {
        let mask = mask_from(&["#..#", "#..#", "...."]);
        let polys = trace(&mask, &frame(4, 3));
        assert_eq!(polys.len(), 2);
        let total: f64 = polys.iter().map(Polygon::area).sum();
        assert!((total - 4.0).abs() < 1e-12);
    }

    #[test]
    fn saddle_corner_keeps_hole_separate() {
        // The hole at (1, 1) touches the outside diagonally at one corner.
        let mask = mask_from(&["##.", "#.#", "###"]);
        let polys = trace(&mask, &frame(3, 3));
        assert_eq!(polys.len(), 1);
        assert_eq!(polys[0].holes.len(), 1);
        assert!((polys[0].area() - 7.0).abs() < 1e-12);

        let ext = &polys[0].exterior;
        let open = &ext[..ext.len() - 1];
        for (i, a) in open.iter().enumerate() {
            assert!(open[i + 1..].iter().all(|b| b != a), "exterior revisits {a:?}");
        }
        assert!(polys[0].contains(Point::new(0.5, 2.5)));
        assert!(!polys[0].contains(Point::new(1.5, 1.5)));
        assert!(!polys[0].contains(Point::new(2.5, 2.5)));
    }

    #[test]
    fn l_shape_area_matches_cell_count() {
        let mask = mask_from(&["#...", "#...", "###."]);
        let polys = trace(&mask, &frame(4, 3));
        assert_eq!(polys.len(), 1);
        assert_eq!(polys[0].exterior.len(), 7);
        assert!((polys[0].area() - 5.0).abs() < 1e-12);
    }
}
