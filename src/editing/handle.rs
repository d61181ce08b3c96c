// Copyright 2025 the Pathbender Authors
// SPDX-License-Identifier: Apache-2.0

//! Editable handle geometry for one path.
//!
//! Each on-curve command contributes an anchor handle, plus up to two
//! off-curve tangent handles: the `cp2` of the command itself (displayed
//! entering the anchor) and the `cp1` of the following command (displayed
//! leaving the anchor, though stored on the next command). Handle positions
//! are reported in scene space so pointer hit-testing works directly on
//! event coordinates.

use kurbo::{Affine, Point};

use crate::path::{PathCommand, PathModel};

/// Which part of an anchor a handle drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    /// The on-curve point itself
    Anchor,
    /// The `cp2` of the anchor's own command
    TangentIn,
    /// The `cp1` of the following command
    TangentOut,
}

/// Stable address of a handle: the command index it anchors to plus the
/// handle kind. A `TangentOut` addresses data stored on command
/// `index + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleRef {
    pub index: usize,
    pub kind: HandleKind,
}

/// A handle with its current scene-space position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub target: HandleRef,
    pub position: Point,
}

impl Handle {
    /// Whether this handle sits on the curve
    pub fn is_anchor(&self) -> bool {
        self.target.kind == HandleKind::Anchor
    }
}

/// Enumerate every editable handle of `path`, placed into scene space by
/// the shape's transform.
pub fn collect_handles(path: &PathModel, placement: Affine) -> Vec<Handle> {
    let mut handles = Vec::new();
    let commands = path.commands();

    for (index, command) in commands.iter().enumerate() {
        let Some(position) = command.end_point() else {
            continue;
        };
        handles.push(Handle {
            target: HandleRef {
                index,
                kind: HandleKind::Anchor,
            },
            position: placement * position,
        });
        if let PathCommand::CubicTo { cp2, .. } = *command {
            handles.push(Handle {
                target: HandleRef {
                    index,
                    kind: HandleKind::TangentIn,
                },
                position: placement * cp2,
            });
        }
        if let Some(PathCommand::CubicTo { cp1, .. }) = commands.get(index + 1) {
            handles.push(Handle {
                target: HandleRef {
                    index,
                    kind: HandleKind::TangentOut,
                },
                position: placement * *cp1,
            });
        }
    }
    handles
}

/// Find the closest handle to `pos` within `max_dist`, preferring anchors
/// over tangent handles when both sit at the same distance.
pub fn find_closest(handles: &[Handle], pos: Point, max_dist: f64) -> Option<Handle> {
    let max_dist_sq = max_dist * max_dist;
    let mut best: Option<(Handle, f64)> = None;

    for handle in handles {
        let dist_sq = handle.position.distance_squared(pos);
        if dist_sq > max_dist_sq {
            continue;
        }
        let closer = match best {
            None => true,
            Some((current, best_sq)) => {
                dist_sq < best_sq
                    || (dist_sq == best_sq && handle.is_anchor() && !current.is_anchor())
            }
        };
        if closer {
            best = Some((*handle, dist_sq));
        }
    }

    best.map(|(handle, _)| handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::normalize;

    fn handle_at(handles: &[Handle], index: usize, kind: HandleKind) -> Option<Point> {
        handles
            .iter()
            .find(|h| h.target == HandleRef { index, kind })
            .map(|h| h.position)
    }

    #[test]
    fn line_path_has_only_anchor_handles() {
        let path = normalize("M 0 0 L 10 0 L 10 10");
        let handles = collect_handles(&path, Affine::IDENTITY);

        assert_eq!(handles.len(), 3);
        assert!(handles.iter().all(|h| h.is_anchor()));
    }

    #[test]
    fn curve_contributes_tangent_handles_to_both_anchors() {
        let path = normalize("M 0 0 C 10 10, 20 10, 30 0");
        let handles = collect_handles(&path, Affine::IDENTITY);

        // Two anchors; cp1 hangs off the move anchor, cp2 off the curve's.
        assert_eq!(handles.len(), 4);
        assert_eq!(
            handle_at(&handles, 0, HandleKind::TangentOut),
            Some(Point::new(10.0, 10.0))
        );
        assert_eq!(
            handle_at(&handles, 1, HandleKind::TangentIn),
            Some(Point::new(20.0, 10.0))
        );
        assert_eq!(handle_at(&handles, 1, HandleKind::TangentOut), None);
    }

    #[test]
    fn close_path_contributes_no_handles() {
        let path = normalize("M 0 0 L 10 0 Z");
        let handles = collect_handles(&path, Affine::IDENTITY);
        assert_eq!(handles.len(), 2);
    }

    #[test]
    fn placement_maps_handles_into_scene_space() {
        let path = normalize("M 0 0 L 10 0");
        let placement = Affine::translate((100.0, 50.0));
        let handles = collect_handles(&path, placement);

        assert_eq!(
            handle_at(&handles, 1, HandleKind::Anchor),
            Some(Point::new(110.0, 50.0))
        );
    }

    #[test]
    fn find_closest_respects_max_dist() {
        let path = normalize("M 0 0 L 10 0");
        let handles = collect_handles(&path, Affine::IDENTITY);

        assert!(find_closest(&handles, Point::new(30.0, 0.0), 5.0).is_none());
        let hit = find_closest(&handles, Point::new(11.0, 1.0), 5.0).unwrap();
        assert_eq!(hit.target.index, 1);
    }

    #[test]
    fn anchors_win_ties_against_tangent_handles() {
        // Degenerate curve where cp2 coincides with the end anchor.
        let path = normalize("M 0 0 C 5 5, 10 0, 10 0");
        let handles = collect_handles(&path, Affine::IDENTITY);

        let hit = find_closest(&handles, Point::new(10.0, 0.0), 5.0).unwrap();
        assert_eq!(hit.target.kind, HandleKind::Anchor);
    }
}
