//! Spatial vertex-deduplication index.
//!
//! An unbalanced binary tree over a growable point array.  `add` either
//! returns the index of an existing point within the merge tolerance or
//! appends the point and returns its fresh index.  Indices are stable for
//! the lifetime of the tree: there is no deletion and no rebalancing.
//!
//! Nodes live in an arena and reference each other by index, so the tree is
//! plain owned data with no pointer graph.

use crate::types::Vector3;

/// Arena node: either a stored point or an axis-aligned split.
#[derive(Debug, Clone, Copy)]
enum Node {
    /// Index into the point array.
    Leaf { index: u32 },
    /// Children branch on `coord(axis) >= cut`.
    Split {
        axis: usize,
        cut: f64,
        lower: u32,
        higher: u32,
    },
}

/// Per-layer vertex index merging near-coincident points.
#[derive(Debug, Clone)]
pub struct VertexTree {
    nodes: Vec<Node>,
    root: Option<u32>,
    points: Vec<Vector3>,
    tol_sq: f64,
}

impl VertexTree {
    /// Create an empty tree with the given squared merge tolerance.
    pub fn new(tol_sq: f64) -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            points: Vec::new(),
            tol_sq,
        }
    }

    /// Number of unique vertices stored so far.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when no vertex has been added.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The backing vertex array, indexed by the values `add` returns.
    pub fn points(&self) -> &[Vector3] {
        &self.points
    }

    /// Look up or insert `point`, returning its stable index.
    pub fn add(&mut self, point: Vector3) -> u32 {
        let root = match self.root {
            Some(r) => r,
            None => {
                // first vertex becomes the root
                self.points.push(point);
                self.nodes.push(Node::Leaf { index: 0 });
                self.root = Some(0);
                return 0;
            }
        };

        // descend to the leaf nearest the incoming point
        let mut cur = root;
        loop {
            match self.nodes[cur as usize] {
                Node::Split {
                    axis,
                    cut,
                    lower,
                    higher,
                } => {
                    cur = if point.coord(axis) >= cut { higher } else { lower };
                }
                Node::Leaf { index } => {
                    let existing = self.points[index as usize];
                    if point.distance_squared(&existing) <= self.tol_sq {
                        // close enough, reuse this vertex
                        return index;
                    }
                    return self.split_leaf(cur, index, point);
                }
            }
        }
    }

    /// Replace the leaf at `node` with a split separating its point from the
    /// new one; returns the new point's index.
    fn split_leaf(&mut self, node: u32, old_index: u32, point: Vector3) -> u32 {
        let existing = self.points[old_index as usize];

        let new_index = self.points.len() as u32;
        self.points.push(point);

        let new_leaf = self.nodes.len() as u32;
        self.nodes.push(Node::Leaf { index: new_index });
        let old_leaf = self.nodes.len() as u32;
        self.nodes.push(Node::Leaf { index: old_index });

        // cut along the coordinate with the biggest separation
        let diff = [
            (point.x - existing.x).abs(),
            (point.y - existing.y).abs(),
            (point.z - existing.z).abs(),
        ];
        let axis = if diff[0] >= diff[1] && diff[0] >= diff[2] {
            0
        } else if diff[1] >= diff[2] && diff[1] >= diff[0] {
            1
        } else {
            2
        };
        let cut = (point.coord(axis) + existing.coord(axis)) * 0.5;

        let (lower, higher) = if point.coord(axis) >= existing.coord(axis) {
            (old_leaf, new_leaf)
        } else {
            (new_leaf, old_leaf)
        };

        self.nodes[node as usize] = Node::Split {
            axis,
            cut,
            lower,
            higher,
        };

        new_index
    }
}
