//! Stitching 2D segments into polylines
use std::collections::{HashMap, HashSet};

use log::debug;
use nalgebra::Vector2;
use ordered_float::OrderedFloat;

/// A connected sequence of points
///
/// Closed loops repeat their first point at the end.
pub type Polyline = Vec<Vector2<f64>>;

/// Exact hash key for a point (with `-0.0 == 0.0`)
type Key = [OrderedFloat<f64>; 2];

fn key(p: &Vector2<f64>) -> Key {
    [OrderedFloat(p.x), OrderedFloat(p.y)]
}

/// Joins segments that share endpoints into polylines
///
/// Endpoints are matched exactly, which works because marching produces
/// bit-identical points on either side of a shared edge.  Degenerate and
/// duplicate segments (in either direction) are dropped.
///
/// Open chains are returned first, each starting from a dangling endpoint in
/// the order those endpoints appear in `segments`; then closed loops follow.
/// Where more than two segments meet at a point, the walk takes the first
/// unused one, so a junction may split a curve into several polylines.
pub fn stitch(segments: &[[Vector2<f64>; 2]]) -> Vec<Polyline> {
    let mut ids: HashMap<Key, usize> = HashMap::new();
    let mut points: Vec<Vector2<f64>> = vec![];
    let mut id = |p: &Vector2<f64>| {
        *ids.entry(key(p)).or_insert_with(|| {
            points.push(*p);
            points.len() - 1
        })
    };

    let mut seen = HashSet::new();
    let mut edges = vec![];
    for [a, b] in segments {
        let (a, b) = (id(a), id(b));
        if a != b && seen.insert((a.min(b), a.max(b))) {
            edges.push((a, b));
        }
    }

    let mut adjacent = vec![vec![]; points.len()];
    for (i, &(a, b)) in edges.iter().enumerate() {
        adjacent[a].push(i);
        adjacent[b].push(i);
    }
    let graph = Graph {
        points,
        edges,
        adjacent,
    };

    let mut used = vec![false; graph.edges.len()];
    let mut out = vec![];
    for &(a, b) in &graph.edges {
        for p in [a, b] {
            let adj = &graph.adjacent[p];
            if adj.len() == 1 && !used[adj[0]] {
                out.push(graph.walk(p, &mut used));
            }
        }
    }
    let open = out.len();
    for &(a, _) in &graph.edges {
        if graph.adjacent[a].iter().any(|&e| !used[e]) {
            out.push(graph.walk(a, &mut used));
        }
    }
    debug!(
        "stitched {} segments into {open} open and {} closed polylines",
        graph.edges.len(),
        out.len() - open
    );
    out
}

/// Segments as a graph, with points deduplicated
struct Graph {
    points: Vec<Vector2<f64>>,
    edges: Vec<(usize, usize)>,
    /// Edges touching each point, in segment order
    adjacent: Vec<Vec<usize>>,
}

impl Graph {
    /// Follows unused edges from `start` until reaching a dead end
    fn walk(&self, start: usize, used: &mut [bool]) -> Polyline {
        let mut line = vec![self.points[start]];
        let mut cur = start;
        while let Some(&e) = self.adjacent[cur].iter().find(|&&e| !used[e]) {
            used[e] = true;
            let (a, b) = self.edges[e];
            cur = if a == cur { b } else { a };
            line.push(self.points[cur]);
        }
        line
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn seg(a: [f64; 2], b: [f64; 2]) -> [Vector2<f64>; 2] {
        [Vector2::from(a), Vector2::from(b)]
    }

    #[test]
    fn test_closed_loop() {
        // Unit square, with segments out of order and in mixed directions
        let segments = [
            seg([1.0, 0.0], [1.0, 1.0]),
            seg([0.0, 1.0], [0.0, 0.0]),
            seg([0.0, 0.0], [1.0, 0.0]),
            seg([0.0, 1.0], [1.0, 1.0]),
        ];
        let out = stitch(&segments);
        assert_eq!(out.len(), 1);
        let line = &out[0];
        assert_eq!(line.len(), 5);
        assert_eq!(line.first(), line.last());
        assert_eq!(line[0], Vector2::new(1.0, 0.0));
        assert_eq!(line[1], Vector2::new(1.0, 1.0));
        assert_eq!(line[2], Vector2::new(0.0, 1.0));
    }

    #[test]
    fn test_open_chain() {
        let segments = [
            seg([1.0, 0.0], [2.0, 0.0]),
            seg([1.0, 0.0], [0.0, 0.0]),
            seg([3.0, 0.0], [2.0, 0.0]),
        ];
        let out = stitch(&segments);
        assert_eq!(out.len(), 1);
        let xs: Vec<f64> = out[0].iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_duplicates() {
        let segments = [
            seg([0.0, 0.0], [1.0, 0.0]),
            seg([1.0, 0.0], [0.0, 0.0]),
            seg([0.0, 0.0], [1.0, 0.0]),
            seg([1.0, 0.0], [1.0, 0.0]),
            seg([1.0, 0.0], [1.0, -0.0]),
        ];
        let out = stitch(&segments);
        assert_eq!(out, vec![vec![Vector2::zeros(), Vector2::new(1.0, 0.0)]]);
    }

    #[test]
    fn test_negative_zero() {
        let segments =
            [seg([0.0, 1.0], [-0.0, 0.0]), seg([0.0, 0.0], [1.0, 0.0])];
        let out = stitch(&segments);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].len(), 3);
    }

    #[test]
    fn test_components() {
        let segments = [
            // Closed triangle
            seg([0.0, 0.0], [1.0, 0.0]),
            seg([1.0, 0.0], [0.0, 1.0]),
            seg([0.0, 1.0], [0.0, 0.0]),
            // Separate open segment
            seg([5.0, 5.0], [6.0, 5.0]),
        ];
        let out = stitch(&segments);
        assert_eq!(out.len(), 2);
        let open = vec![Vector2::new(5.0, 5.0), Vector2::new(6.0, 5.0)];
        assert_eq!(out[0], open);
        assert_eq!(out[1].len(), 4);
        assert_eq!(out[1][0], out[1][3]);

        assert!(stitch(&[]).is_empty());
    }
}
