//! Proximity clustering of raw vertices.
//!
//! Polygon approximation of neighbouring contours (and of the two
//! sides of a thick wall) reports the same physical corner several
//! times a few pixels apart. Clustering collapses those detections
//! into one representative vertex.
//!
//! Linkage is anchor-only: the first unvisited vertex in input order
//! opens a cluster and claims every later unvisited vertex within
//! `epsilon` of *itself*. Members never extend the reach, so a chain of
//! vertices spaced just under `epsilon` apart is not merged end to end.
//! The pass is O(n²), which is fine for the tens to hundreds of
//! corners a floorplan produces.

use serde::{Deserialize, Serialize};

use crate::types::Point;

/// A group of raw vertices merged into one.
///
/// Indices refer to the slice passed to [`cluster`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    /// Index of the vertex that opened the cluster.
    pub anchor: usize,
    /// Indices of every member, anchor first, in input order.
    pub members: Vec<usize>,
}

impl Cluster {
    /// Number of raw vertices in the cluster.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if the cluster has no members.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Component-wise mean of the members' coordinates.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn centroid(&self, points: &[Point]) -> Point {
        let (sx, sy, n) = self
            .members
            .iter()
            .filter_map(|&i| points.get(i))
            .fold((0.0, 0.0, 0_usize), |(sx, sy, n), p| (sx + p.x, sy + p.y, n + 1));
        if n == 0 {
            return Point::new(0.0, 0.0);
        }
        let n = n as f64;
        Point::new(sx / n, sy / n)
    }
}

/// Group `points` by anchor-only proximity.
///
/// Clusters are returned in anchor order and partition the input: every
/// index appears in exactly one cluster.
#[must_use = "returns the clusters"]
pub fn cluster(points: &[Point], epsilon: f64) -> Vec<Cluster> {
    let mut visited = vec![false; points.len()];
    let mut clusters = Vec::new();

    for (i, &anchor) in points.iter().enumerate() {
        if visited[i] {
            continue;
        }
        visited[i] = true;
        let mut members = vec![i];

        for (j, &candidate) in points.iter().enumerate().skip(i + 1) {
            if !visited[j] && anchor.distance(candidate) <= epsilon {
                visited[j] = true;
                members.push(j);
            }
        }

        clusters.push(Cluster { anchor: i, members });
    }

    clusters
}

/// Merge nearby vertices, returning one centroid per cluster in anchor
/// order.
#[must_use = "returns the merged vertices"]
pub fn merge(points: &[Point], epsilon: f64) -> Vec<Point> {
    cluster(points, epsilon)
        .iter()
        .map(|c| c.centroid(points))
        .collect()
}
