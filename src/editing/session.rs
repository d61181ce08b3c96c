// Copyright 2025 the Pathbender Authors
// SPDX-License-Identifier: Apache-2.0

//! Edit session — node editing state for a single drag gesture.
//!
//! A session is created on pointer-down from the shape's persisted path
//! string and placement transform, holds the only mutable copy of the path
//! while the gesture runs, and is consumed on pointer-up. Every drag step
//! reports the live geometry through the session's live callback; finishing
//! the gesture serializes the working copy and reports it once through the
//! commit callback. Nothing outside the session changes until that commit,
//! and a new gesture always re-parses from the persisted string, so sessions
//! never carry state across gestures.
//!
//! Anchor drags are rigid: the tangent handles touching a dragged anchor
//! translate with it unchanged, and dragging one tangent handle never moves
//! its opposite neighbor. There is no smooth/corner continuity solver here.

use kurbo::{Affine, Point, Vec2};

use super::handle::{self, Handle, HandleKind, HandleRef};
use crate::path::{PathCommand, PathModel, normalize, serialize};

/// Called with the live working copy after every drag step
pub type LiveCallback = Box<dyn FnMut(&PathModel)>;
/// Called exactly once per gesture with the committed path string
pub type CommitCallback = Box<dyn FnMut(String)>;

/// Editing session for one drag gesture on one path
pub struct EditSession {
    /// Working copy, mutated in place while the gesture runs
    path: PathModel,
    /// Shape placement mapping path space into scene space
    placement: Affine,
    /// Inverse placement for mapping pointer deltas back into path space
    inverse_placement: Affine,
    /// The handle being dragged, once a drag has begun
    active: Option<HandleRef>,
    on_live: LiveCallback,
    on_commit: CommitCallback,
}

impl EditSession {
    /// Begin a session from the persisted path string.
    ///
    /// `placement` is the shape's position/rotation/scale; handle geometry
    /// and drag deltas are exchanged in scene space through it. An
    /// unparseable string yields a session over the empty model, which has
    /// no handles and commits the empty string.
    pub fn begin(
        source: &str,
        placement: Affine,
        on_live: LiveCallback,
        on_commit: CommitCallback,
    ) -> Self {
        let path = normalize(source);
        tracing::debug!(commands = path.len(), "edit session started");
        Self {
            path,
            placement,
            inverse_placement: placement.inverse(),
            active: None,
            on_live,
            on_commit,
        }
    }

    /// The live working copy
    pub fn path(&self) -> &PathModel {
        &self.path
    }

    /// Every editable handle in scene space
    pub fn handles(&self) -> Vec<Handle> {
        handle::collect_handles(&self.path, self.placement)
    }

    /// The closest handle within `max_dist` scene units of `scene_pos`
    pub fn hit_test(&self, scene_pos: Point, max_dist: f64) -> Option<Handle> {
        handle::find_closest(&self.handles(), scene_pos, max_dist)
    }

    /// Start dragging a handle. Returns false (and leaves the session
    /// unchanged) if the reference does not address a live handle.
    pub fn begin_drag(&mut self, target: HandleRef) -> bool {
        if !self.is_valid_target(target) {
            tracing::debug!(?target, "rejected drag of unknown handle");
            return false;
        }
        self.active = Some(target);
        true
    }

    /// Apply one pointer movement, in scene units, to the dragged handle
    /// and report the live geometry. A no-op when no drag is active.
    pub fn drag_by(&mut self, scene_delta: Vec2) {
        let Some(target) = self.active else {
            return;
        };

        // Placement may rotate or scale the shape; the handle must follow
        // the pointer, so map the delta back into path space through the
        // linear part of the inverse (deltas ignore translation).
        let [a, b, c, d, _, _] = self.inverse_placement.as_coeffs();
        let delta = Vec2::new(
            a * scene_delta.x + c * scene_delta.y,
            b * scene_delta.x + d * scene_delta.y,
        );
        match target.kind {
            HandleKind::Anchor => self.drag_anchor(target.index, delta),
            HandleKind::TangentIn => self.drag_tangent_in(target.index, delta),
            HandleKind::TangentOut => self.drag_tangent_out(target.index, delta),
        }
        (self.on_live)(&self.path);
    }

    /// End the gesture: serialize the working copy and hand it to the
    /// commit callback. Consumes the session; the next gesture re-parses
    /// from the committed string.
    pub fn finish(mut self) {
        let committed = serialize(&self.path);
        tracing::debug!(len = committed.len(), "edit session committed");
        (self.on_commit)(committed);
    }

    fn is_valid_target(&self, target: HandleRef) -> bool {
        let commands = self.path.commands();
        match target.kind {
            HandleKind::Anchor => commands
                .get(target.index)
                .is_some_and(|c| c.end_point().is_some()),
            HandleKind::TangentIn => matches!(
                commands.get(target.index),
                Some(PathCommand::CubicTo { .. })
            ),
            HandleKind::TangentOut => matches!(
                commands.get(target.index + 1),
                Some(PathCommand::CubicTo { .. })
            ),
        }
    }

    /// Move an anchor and, rigidly, the tangent handles glued to it: the
    /// `cp2` of its own command and the `cp1` of the next. Opposite
    /// handles of those tangents are untouched.
    fn drag_anchor(&mut self, index: usize, delta: Vec2) {
        let commands = self.path.commands_mut();
        match &mut commands[index] {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => *p += delta,
            PathCommand::CubicTo { cp2, to, .. } => {
                *cp2 += delta;
                *to += delta;
            }
            PathCommand::ClosePath => {}
        }
        if let Some(PathCommand::CubicTo { cp1, .. }) = commands.get_mut(index + 1) {
            *cp1 += delta;
        }
    }

    fn drag_tangent_in(&mut self, index: usize, delta: Vec2) {
        if let Some(PathCommand::CubicTo { cp2, .. }) =
            self.path.commands_mut().get_mut(index)
        {
            *cp2 += delta;
        }
    }

    fn drag_tangent_out(&mut self, index: usize, delta: Vec2) {
        if let Some(PathCommand::CubicTo { cp1, .. }) =
            self.path.commands_mut().get_mut(index + 1)
        {
            *cp1 += delta;
        }
    }
}

impl std::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("path", &self.path)
            .field("placement", &self.placement)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const CURVE: &str = "M 0 0 C 10 10, 20 10, 30 0 C 40 -10, 50 -10, 60 0";

    fn quiet_session(source: &str) -> EditSession {
        EditSession::begin(
            source,
            Affine::IDENTITY,
            Box::new(|_| {}),
            Box::new(|_| {}),
        )
    }

    fn cubic_parts(command: PathCommand) -> (Point, Point, Point) {
        match command {
            PathCommand::CubicTo { cp1, cp2, to } => (cp1, cp2, to),
            other => panic!("expected a cubic, got {other:?}"),
        }
    }

    #[test]
    fn anchor_drag_translates_glued_handles_rigidly() {
        let mut session = quiet_session(CURVE);
        assert!(session.begin_drag(HandleRef {
            index: 1,
            kind: HandleKind::Anchor,
        }));
        session.drag_by(Vec2::new(3.0, 4.0));

        let (cp1, cp2, to) = cubic_parts(session.path().commands()[1]);
        // cp1 belongs to the previous anchor and must not move.
        assert_eq!(cp1, Point::new(10.0, 10.0));
        assert_eq!(cp2, Point::new(23.0, 14.0));
        assert_eq!(to, Point::new(33.0, 4.0));

        // The next command's cp1 is glued to the dragged anchor.
        let (next_cp1, next_cp2, next_to) = cubic_parts(session.path().commands()[2]);
        assert_eq!(next_cp1, Point::new(43.0, -6.0));
        assert_eq!(next_cp2, Point::new(50.0, -10.0));
        assert_eq!(next_to, Point::new(60.0, 0.0));
    }

    #[test]
    fn tangent_drag_moves_only_its_own_control() {
        let mut session = quiet_session(CURVE);
        assert!(session.begin_drag(HandleRef {
            index: 1,
            kind: HandleKind::TangentIn,
        }));
        session.drag_by(Vec2::new(-2.0, 5.0));

        let (cp1, cp2, to) = cubic_parts(session.path().commands()[1]);
        assert_eq!(cp1, Point::new(10.0, 10.0));
        assert_eq!(cp2, Point::new(18.0, 15.0));
        assert_eq!(to, Point::new(30.0, 0.0));

        // The opposite handle across the anchor does not rotate to match.
        let (next_cp1, _, _) = cubic_parts(session.path().commands()[2]);
        assert_eq!(next_cp1, Point::new(40.0, -10.0));
    }

    #[test]
    fn tangent_out_is_stored_on_the_following_command() {
        let mut session = quiet_session(CURVE);
        assert!(session.begin_drag(HandleRef {
            index: 1,
            kind: HandleKind::TangentOut,
        }));
        session.drag_by(Vec2::new(1.0, 1.0));

        let (next_cp1, _, _) = cubic_parts(session.path().commands()[2]);
        assert_eq!(next_cp1, Point::new(41.0, -9.0));
        // Command 1 itself is untouched.
        let (_, cp2, _) = cubic_parts(session.path().commands()[1]);
        assert_eq!(cp2, Point::new(20.0, 10.0));
    }

    #[test]
    fn move_anchor_drag_carries_the_following_cp1() {
        let mut session = quiet_session(CURVE);
        assert!(session.begin_drag(HandleRef {
            index: 0,
            kind: HandleKind::Anchor,
        }));
        session.drag_by(Vec2::new(5.0, 0.0));

        assert_eq!(
            session.path().commands()[0],
            PathCommand::MoveTo(Point::new(5.0, 0.0))
        );
        let (cp1, cp2, _) = cubic_parts(session.path().commands()[1]);
        assert_eq!(cp1, Point::new(15.0, 10.0));
        assert_eq!(cp2, Point::new(20.0, 10.0));
    }

    #[test]
    fn live_callback_fires_per_step_and_commit_once() {
        let live_count = Rc::new(RefCell::new(0));
        let committed: Rc<RefCell<Option<String>>> = Rc::new(RefCell::new(None));

        let live = Rc::clone(&live_count);
        let commit = Rc::clone(&committed);
        let mut session = EditSession::begin(
            "M 0 0 L 10 0",
            Affine::IDENTITY,
            Box::new(move |_| *live.borrow_mut() += 1),
            Box::new(move |s| *commit.borrow_mut() = Some(s)),
        );

        session.begin_drag(HandleRef {
            index: 1,
            kind: HandleKind::Anchor,
        });
        session.drag_by(Vec2::new(1.0, 0.0));
        session.drag_by(Vec2::new(1.0, 0.0));
        session.drag_by(Vec2::new(0.0, 2.0));
        session.finish();

        assert_eq!(*live_count.borrow(), 3);
        assert_eq!(committed.borrow().as_deref(), Some("M 0 0 L 12 2"));
    }

    #[test]
    fn drag_without_begin_is_ignored() {
        let live_count = Rc::new(RefCell::new(0));
        let live = Rc::clone(&live_count);
        let mut session = EditSession::begin(
            "M 0 0 L 10 0",
            Affine::IDENTITY,
            Box::new(move |_| *live.borrow_mut() += 1),
            Box::new(|_| {}),
        );

        session.drag_by(Vec2::new(1.0, 0.0));
        assert_eq!(*live_count.borrow(), 0);
        assert_eq!(session.path(), &normalize("M 0 0 L 10 0"));
    }

    #[test]
    fn scene_deltas_are_mapped_through_the_placement() {
        // Shape scaled 2x: a 10-unit pointer move is a 5-unit path move.
        let placement = Affine::scale(2.0);
        let mut session = EditSession::begin(
            "M 0 0 L 10 0",
            placement,
            Box::new(|_| {}),
            Box::new(|_| {}),
        );

        session.begin_drag(HandleRef {
            index: 1,
            kind: HandleKind::Anchor,
        });
        session.drag_by(Vec2::new(10.0, 0.0));
        assert_eq!(
            session.path().commands()[1],
            PathCommand::LineTo(Point::new(15.0, 0.0))
        );

        // And the handle reports back in scene space.
        let hit = session.hit_test(Point::new(30.0, 0.0), 1.0).unwrap();
        assert_eq!(hit.target.index, 1);
    }

    #[test]
    fn invalid_targets_are_rejected() {
        let mut session = quiet_session("M 0 0 L 10 0");
        assert!(!session.begin_drag(HandleRef {
            index: 1,
            kind: HandleKind::TangentIn,
        }));
        assert!(!session.begin_drag(HandleRef {
            index: 5,
            kind: HandleKind::Anchor,
        }));
    }

    #[test]
    fn unparseable_source_commits_the_empty_string() {
        let committed: Rc<RefCell<Option<String>>> = Rc::new(RefCell::new(None));
        let commit = Rc::clone(&committed);
        let session = EditSession::begin(
            "definitely not a path",
            Affine::IDENTITY,
            Box::new(|_| {}),
            Box::new(move |s| *commit.borrow_mut() = Some(s)),
        );

        assert!(session.handles().is_empty());
        session.finish();
        assert_eq!(committed.borrow().as_deref(), Some(""));
    }
}
