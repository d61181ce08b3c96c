// Copyright 2025 the Pathbender Authors
// SPDX-License-Identifier: Apache-2.0

//! Bounding-rect quadtree for viewport culling and hit-testing.
//!
//! The renderer flattens every shape (nested ones included) to an
//! `IndexEntry`, an opaque id plus an axis-aligned bounding rect, and
//! rebuilds the index wholesale whenever the shape set changes. Queries then
//! return candidate entries for a viewport or pointer rect without a linear
//! scan over the scene.
//!
//! Retrieval is over-inclusive by design: a query may return entries whose
//! rect does not actually intersect it near quadrant boundaries, but it never
//! misses one that does. Callers that need an exact answer run their own
//! precise test on the candidates; do not tighten this into an
//! exact-intersection filter.

use kurbo::Rect;
use serde::{Deserialize, Serialize};

/// Rects per node before it splits
const DEFAULT_MAX_OBJECTS: usize = 10;
/// Maximum tree depth; deeper nodes accumulate without splitting
const DEFAULT_MAX_LEVELS: usize = 5;

/// A flattened bounding-rect record for one indexed shape.
///
/// The id is an opaque token owned by the renderer; the index never resolves
/// it back to a shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: u64,
    pub rect: Rect,
}

impl IndexEntry {
    pub fn new(id: u64, rect: Rect) -> Self {
        Self { id, rect }
    }
}

/// A rebuild-per-frame spatial index over shape bounding rects.
///
/// Build, query, discard: the index is not maintained incrementally. Any
/// change to the shape set means a `clear` and a fresh set of inserts before
/// the next query pass.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    root: QuadNode,
    len: usize,
}

impl SpatialIndex {
    /// Create an index covering `bounds` with the default node limits
    pub fn new(bounds: Rect) -> Self {
        Self::with_limits(bounds, DEFAULT_MAX_OBJECTS, DEFAULT_MAX_LEVELS)
    }

    /// Create an index with explicit split limits
    pub fn with_limits(bounds: Rect, max_objects: usize, max_levels: usize) -> Self {
        Self {
            root: QuadNode::new(0, bounds, max_objects, max_levels),
            len: 0,
        }
    }

    /// Number of entries inserted since the last clear
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the index holds no entries
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert one entry.
    ///
    /// An entry straddling a quadrant boundary stays at the deepest node
    /// that fully contains it; entries outside the root bounds stay at the
    /// root. Neither case is an error.
    pub fn insert(&mut self, entry: IndexEntry) {
        self.root.insert(entry);
        self.len += 1;
    }

    /// Collect the candidate entries for a query rect.
    ///
    /// Guaranteed to include every entry whose rect intersects the query;
    /// may include a few that do not (see the module docs).
    pub fn retrieve(&self, query: Rect) -> Vec<IndexEntry> {
        let mut out = Vec::new();
        self.root.collect(&query, &mut out);
        tracing::debug!(
            candidates = out.len(),
            total = self.len,
            "spatial query"
        );
        out
    }

    /// Discard every entry and all child nodes for a full rebuild
    pub fn clear(&mut self) {
        self.root.entries.clear();
        self.root.children = None;
        self.len = 0;
    }
}

/// One node of the quadtree. Child order is top-right, top-left,
/// bottom-left, bottom-right.
#[derive(Debug, Clone)]
struct QuadNode {
    level: usize,
    bounds: Rect,
    entries: Vec<IndexEntry>,
    children: Option<Box<[QuadNode; 4]>>,
    max_objects: usize,
    max_levels: usize,
}

impl QuadNode {
    fn new(level: usize, bounds: Rect, max_objects: usize, max_levels: usize) -> Self {
        Self {
            level,
            bounds,
            entries: Vec::new(),
            children: None,
            max_objects,
            max_levels,
        }
    }

    fn child_bounds(&self, quadrant: usize) -> Rect {
        let mid = self.bounds.center();
        match quadrant {
            0 => Rect::new(mid.x, self.bounds.y0, self.bounds.x1, mid.y),
            1 => Rect::new(self.bounds.x0, self.bounds.y0, mid.x, mid.y),
            2 => Rect::new(self.bounds.x0, mid.y, mid.x, self.bounds.y1),
            _ => Rect::new(mid.x, mid.y, self.bounds.x1, self.bounds.y1),
        }
    }

    fn insert(&mut self, entry: IndexEntry) {
        if let Some(children) = self.children.as_mut()
            && let Some(q) = quadrant_of(&self.bounds, &entry.rect)
        {
            children[q].insert(entry);
            return;
        }

        self.entries.push(entry);

        if self.entries.len() > self.max_objects && self.level < self.max_levels {
            if self.children.is_none() {
                self.split();
            }
            self.redistribute();
        }
    }

    /// Create the four children. A node never un-splits.
    fn split(&mut self) {
        let child = |q: usize| {
            QuadNode::new(
                self.level + 1,
                self.child_bounds(q),
                self.max_objects,
                self.max_levels,
            )
        };
        self.children = Some(Box::new([child(0), child(1), child(2), child(3)]));
    }

    /// Push every entry that fits fully inside exactly one child down into
    /// that child; straddling entries stay here.
    fn redistribute(&mut self) {
        let mut children = self.children.take().expect("redistribute after split");
        let mut keep = Vec::new();
        for entry in self.entries.drain(..) {
            match quadrant_of(&self.bounds, &entry.rect) {
                Some(q) => children[q].insert(entry),
                None => keep.push(entry),
            }
        }
        self.entries = keep;
        self.children = Some(children);
    }

    fn collect(&self, query: &Rect, out: &mut Vec<IndexEntry>) {
        out.extend_from_slice(&self.entries);

        let Some(children) = &self.children else {
            return;
        };

        if let Some(q) = quadrant_of(&self.bounds, query) {
            // The query fits in one quadrant; this node's own straddling
            // entries were already included above.
            children[q].collect(query, out);
        } else {
            for child in children.iter() {
                if rects_intersect(&child.bounds, query) {
                    child.collect(query, out);
                }
            }
        }
    }
}

/// The child quadrant of `bounds` that fully contains `rect`, if any.
/// Rects that touch or cross the midlines belong to the node itself.
fn quadrant_of(bounds: &Rect, rect: &Rect) -> Option<usize> {
    let mid = bounds.center();

    let top = rect.y1 < mid.y;
    let bottom = rect.y0 > mid.y;
    let left = rect.x1 < mid.x;
    let right = rect.x0 > mid.x;

    match (top, bottom, left, right) {
        (true, _, _, true) => Some(0),
        (true, _, true, _) => Some(1),
        (_, true, true, _) => Some(2),
        (_, true, _, true) => Some(3),
        _ => None,
    }
}

/// Axis-aligned overlap test, inclusive of shared edges
fn rects_intersect(a: &Rect, b: &Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}
