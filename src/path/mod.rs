// Copyright 2025 the Pathbender Authors
// SPDX-License-Identifier: Apache-2.0

//! Canonical path representation — the editable form of a shape outline.
//!
//! Every shape outline, whatever command grammar it was authored in, is held
//! as a `PathModel`: an ordered sequence of `MoveTo`/`LineTo`/`CubicTo`
//! commands with an optional trailing `ClosePath`. The normalizer produces
//! this form from a path string, the editor mutates it during a drag gesture,
//! and the serializer turns it back into the persisted string. All coordinate
//! data flows through `kurbo` types so the model converts directly to a
//! `kurbo::BezPath` for rendering and bounds computation.

pub mod arc;
pub mod normalize;
pub mod serialize;

pub use normalize::{ParseError, normalize, try_normalize};
pub use serialize::serialize;

use kurbo::{BezPath, Point, Rect, Shape};
use serde::{Deserialize, Serialize};

/// A single canonical path command.
///
/// The set is closed: adding a command kind is a compile-time-checked change
/// across the normalizer, serializer, and editor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathCommand {
    /// Start the (single) subpath at a point
    MoveTo(Point),
    /// Straight segment to a point
    LineTo(Point),
    /// Cubic bezier segment
    ///
    /// `cp1` is the tangent handle leaving the previous anchor, `cp2` the
    /// tangent handle entering this command's anchor at `to`.
    CubicTo {
        cp1: Point,
        cp2: Point,
        to: Point,
    },
    /// Terminal marker closing the subpath; carries no coordinates
    ClosePath,
}

impl PathCommand {
    /// The on-curve point of this command, if it has one
    pub fn end_point(&self) -> Option<Point> {
        match *self {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => Some(p),
            PathCommand::CubicTo { to, .. } => Some(to),
            PathCommand::ClosePath => None,
        }
    }
}

/// An on-curve anchor derived from a command index.
///
/// Anchors have no identity beyond their index; the handles they display are
/// owned by the commands that carry them. `handle_in` is the `cp2` of the
/// anchor's own command, `handle_out` the `cp1` of the following command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    /// Index of the command this anchor belongs to
    pub index: usize,
    /// On-curve position
    pub position: Point,
    /// Tangent handle entering this anchor, if the command is a curve
    pub handle_in: Option<Point>,
    /// Tangent handle leaving this anchor, if the next command is a curve
    pub handle_out: Option<Point>,
}

/// An ordered sequence of canonical commands describing one open or closed
/// contour.
///
/// Invariants: a non-empty model begins with `MoveTo`; at most one
/// `ClosePath` appears, and only as the last element; every coordinate is
/// finite. The empty model is a valid value meaning "nothing to render" and
/// doubles as the recovery value for unparseable input.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PathModel {
    commands: Vec<PathCommand>,
}

impl PathModel {
    /// Create an empty model
    pub fn empty() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Create a model from a command sequence.
    ///
    /// The caller is responsible for upholding the model invariants; the
    /// normalizer and the edit session do so by construction.
    pub fn from_commands(commands: Vec<PathCommand>) -> Self {
        debug_assert!(
            commands.is_empty() || matches!(commands[0], PathCommand::MoveTo(_)),
            "path must begin with MoveTo"
        );
        Self { commands }
    }

    /// The command sequence
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub(crate) fn commands_mut(&mut self) -> &mut [PathCommand] {
        &mut self.commands
    }

    /// Number of commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the model holds no commands
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Whether the contour ends with a `ClosePath`
    pub fn is_closed(&self) -> bool {
        matches!(self.commands.last(), Some(PathCommand::ClosePath))
    }

    /// Derive the anchor views for every on-curve command
    pub fn anchors(&self) -> Vec<Anchor> {
        self.commands
            .iter()
            .enumerate()
            .filter_map(|(index, command)| {
                let position = command.end_point()?;
                let handle_in = match *command {
                    PathCommand::CubicTo { cp2, .. } => Some(cp2),
                    _ => None,
                };
                let handle_out = match self.commands.get(index + 1) {
                    Some(PathCommand::CubicTo { cp1, .. }) => Some(*cp1),
                    _ => None,
                };
                Some(Anchor {
                    index,
                    position,
                    handle_in,
                    handle_out,
                })
            })
            .collect()
    }

    /// Convert to a kurbo `BezPath` for rendering
    pub fn to_bezpath(&self) -> BezPath {
        let mut bez = BezPath::new();
        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(p) => bez.move_to(p),
                PathCommand::LineTo(p) => bez.line_to(p),
                PathCommand::CubicTo { cp1, cp2, to } => bez.curve_to(cp1, cp2, to),
                PathCommand::ClosePath => bez.close_path(),
            }
        }
        bez
    }

    /// Axis-aligned bounding box of the rendered curve, or `None` for the
    /// empty model
    pub fn bounding_rect(&self) -> Option<Rect> {
        if self.is_empty() {
            return None;
        }
        Some(self.to_bezpath().bounding_box())
    }
}
