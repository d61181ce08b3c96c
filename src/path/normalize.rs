// Copyright 2025 the Pathbender Authors
// SPDX-License-Identifier: Apache-2.0

//! Path string parsing and canonicalization.
//!
//! Input is the full mixed command grammar `M L H V C S Q T A Z`, absolute
//! or relative (lowercase), numbers separated by whitespace or commas, with
//! the usual implicit command repetition. Output is a `PathModel` carrying
//! only `MoveTo`/`LineTo`/`CubicTo`/`ClosePath`:
//!
//! * `H`/`V` become lines reusing the untouched axis,
//! * `S`/`T` synthesize their reflected control point,
//! * `Q` is raised to a cubic,
//! * `A` is decomposed by the arc converter,
//! * everything else passes through.
//!
//! A string that fails to tokenize yields the empty model rather than an
//! error; callers treat that as "nothing to render". The fallible variant is
//! exposed for callers that want the diagnostic.

use kurbo::Point;
use thiserror::Error;

use super::arc::arc_to_cubics;
use super::{PathCommand, PathModel};

/// Why a path string failed to parse.
///
/// Never escapes `normalize`; surfaced only by `try_normalize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedCharacter { found: char, offset: usize },
    #[error("expected a number at offset {0}")]
    ExpectedNumber(usize),
    #[error("expected an arc flag (0 or 1) at offset {0}")]
    ExpectedFlag(usize),
    #[error("non-finite coordinate at offset {0}")]
    NonFiniteNumber(usize),
    #[error("path must begin with a move command")]
    MissingMove,
    #[error("command at offset {0} after the path was closed")]
    CommandAfterClose(usize),
    #[error("second subpath at offset {0}; only one contour is supported")]
    SecondSubpath(usize),
}

/// Parse a path string into the canonical model.
///
/// Malformed input is recovered locally: the failure is logged and the empty
/// model returned, which renders as nothing.
pub fn normalize(source: &str) -> PathModel {
    match try_normalize(source) {
        Ok(model) => model,
        Err(err) => {
            tracing::warn!("discarding unparseable path: {err}");
            PathModel::empty()
        }
    }
}

/// Fallible variant of [`normalize`]
pub fn try_normalize(source: &str) -> Result<PathModel, ParseError> {
    Parser::new(source).run()
}

/// Reflect `p` through `center`
fn reflect(p: Point, center: Point) -> Point {
    Point::new(2.0 * center.x - p.x, 2.0 * center.y - p.y)
}

/// What the previous segment was, for `S`/`T` control point reflection
#[derive(Clone, Copy, PartialEq)]
enum LastSegment {
    None,
    Cubic,
    Quadratic,
    Other,
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    commands: Vec<PathCommand>,
    /// Current pen position
    current: Point,
    /// Most recently used off-curve control, for reflection. For quadratics
    /// this is the quadratic control itself, not the raised cubic handle.
    last_control: Point,
    last_segment: LastSegment,
    closed: bool,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            lexer: Lexer::new(source),
            commands: Vec::new(),
            current: Point::ORIGIN,
            last_control: Point::ORIGIN,
            last_segment: LastSegment::None,
            closed: false,
        }
    }

    fn run(mut self) -> Result<PathModel, ParseError> {
        while let Some((letter, offset)) = self.lexer.command()? {
            if self.closed {
                return Err(ParseError::CommandAfterClose(offset));
            }
            let relative = letter.is_ascii_lowercase();
            match letter.to_ascii_uppercase() {
                'M' => self.move_to(relative, offset)?,
                'L' => self.repeat(|p| p.line_to(relative))?,
                'H' => self.repeat(|p| p.horizontal_to(relative))?,
                'V' => self.repeat(|p| p.vertical_to(relative))?,
                'C' => self.repeat(|p| p.cubic_to(relative))?,
                'S' => self.repeat(|p| p.smooth_cubic_to(relative))?,
                'Q' => self.repeat(|p| p.quad_to(relative))?,
                'T' => self.repeat(|p| p.smooth_quad_to(relative))?,
                'A' => self.repeat(|p| p.arc_to(relative))?,
                'Z' => {
                    if self.commands.is_empty() {
                        return Err(ParseError::MissingMove);
                    }
                    self.commands.push(PathCommand::ClosePath);
                    self.closed = true;
                }
                other => {
                    return Err(ParseError::UnexpectedCharacter {
                        found: if relative {
                            other.to_ascii_lowercase()
                        } else {
                            other
                        },
                        offset,
                    });
                }
            }
        }
        Ok(PathModel::from_commands(self.commands))
    }

    /// Run one command group, then again for each implicit repetition
    fn repeat(
        &mut self,
        mut op: impl FnMut(&mut Self) -> Result<(), ParseError>,
    ) -> Result<(), ParseError> {
        if self.commands.is_empty() {
            return Err(ParseError::MissingMove);
        }
        op(self)?;
        while self.lexer.starts_number() {
            op(self)?;
        }
        Ok(())
    }

    fn move_to(&mut self, relative: bool, offset: usize) -> Result<(), ParseError> {
        if !self.commands.is_empty() {
            return Err(ParseError::SecondSubpath(offset));
        }
        let to = self.point(relative)?;
        self.commands.push(PathCommand::MoveTo(to));
        self.advance(to);
        // Extra coordinate pairs after a move are implicit line commands.
        while self.lexer.starts_number() {
            self.line_to(relative)?;
        }
        Ok(())
    }

    fn line_to(&mut self, relative: bool) -> Result<(), ParseError> {
        let to = self.point(relative)?;
        self.commands.push(PathCommand::LineTo(to));
        self.advance(to);
        Ok(())
    }

    fn horizontal_to(&mut self, relative: bool) -> Result<(), ParseError> {
        let x = self.lexer.number()?;
        let x = if relative { self.current.x + x } else { x };
        let to = Point::new(x, self.current.y);
        self.commands.push(PathCommand::LineTo(to));
        self.advance(to);
        Ok(())
    }

    fn vertical_to(&mut self, relative: bool) -> Result<(), ParseError> {
        let y = self.lexer.number()?;
        let y = if relative { self.current.y + y } else { y };
        let to = Point::new(self.current.x, y);
        self.commands.push(PathCommand::LineTo(to));
        self.advance(to);
        Ok(())
    }

    fn cubic_to(&mut self, relative: bool) -> Result<(), ParseError> {
        let cp1 = self.point(relative)?;
        let cp2 = self.point(relative)?;
        let to = self.point(relative)?;
        self.push_cubic(cp1, cp2, to);
        Ok(())
    }

    fn smooth_cubic_to(&mut self, relative: bool) -> Result<(), ParseError> {
        let cp1 = if self.last_segment == LastSegment::Cubic {
            reflect(self.last_control, self.current)
        } else {
            self.current
        };
        let cp2 = self.point(relative)?;
        let to = self.point(relative)?;
        self.push_cubic(cp1, cp2, to);
        Ok(())
    }

    fn quad_to(&mut self, relative: bool) -> Result<(), ParseError> {
        let qc = self.point(relative)?;
        let to = self.point(relative)?;
        self.push_quad(qc, to);
        Ok(())
    }

    fn smooth_quad_to(&mut self, relative: bool) -> Result<(), ParseError> {
        let qc = if self.last_segment == LastSegment::Quadratic {
            reflect(self.last_control, self.current)
        } else {
            self.current
        };
        let to = self.point(relative)?;
        self.push_quad(qc, to);
        Ok(())
    }

    fn arc_to(&mut self, relative: bool) -> Result<(), ParseError> {
        let rx = self.lexer.number()?;
        let ry = self.lexer.number()?;
        let x_rotation = self.lexer.number()?;
        let large_arc = self.lexer.flag()?;
        let sweep = self.lexer.flag()?;
        let to = self.point(relative)?;

        let segments = arc_to_cubics(self.current, rx, ry, x_rotation, large_arc, sweep, to);
        if segments.is_empty() {
            // Degenerate arc: nothing drawn, but the pen still moves so
            // later relative coordinates resolve against the endpoint.
            self.advance(to);
            return Ok(());
        }
        for segment in segments {
            if let PathCommand::CubicTo { cp2, to, .. } = segment {
                self.current = to;
                self.last_control = cp2;
            }
            self.commands.push(segment);
        }
        self.last_segment = LastSegment::Other;
        Ok(())
    }

    fn push_cubic(&mut self, cp1: Point, cp2: Point, to: Point) {
        self.commands.push(PathCommand::CubicTo { cp1, cp2, to });
        self.current = to;
        self.last_control = cp2;
        self.last_segment = LastSegment::Cubic;
    }

    /// Raise a quadratic segment to the equivalent cubic
    fn push_quad(&mut self, qc: Point, to: Point) {
        let cp1 = Point::new(
            self.current.x + 2.0 / 3.0 * (qc.x - self.current.x),
            self.current.y + 2.0 / 3.0 * (qc.y - self.current.y),
        );
        let cp2 = Point::new(
            to.x + 2.0 / 3.0 * (qc.x - to.x),
            to.y + 2.0 / 3.0 * (qc.y - to.y),
        );
        self.commands.push(PathCommand::CubicTo { cp1, cp2, to });
        self.current = to;
        // The reflection for a following T works on the quadratic control,
        // not on the raised cubic handles.
        self.last_control = qc;
        self.last_segment = LastSegment::Quadratic;
    }

    /// Move the pen without a curve in flight
    fn advance(&mut self, to: Point) {
        self.current = to;
        self.last_control = to;
        self.last_segment = LastSegment::Other;
    }

    fn point(&mut self, relative: bool) -> Result<Point, ParseError> {
        let x = self.lexer.number()?;
        let y = self.lexer.number()?;
        if relative {
            Ok(Point::new(self.current.x + x, self.current.y + y))
        } else {
            Ok(Point::new(x, y))
        }
    }
}

/// Byte-level tokenizer over a path string.
///
/// Commas count as separators, numbers follow the SVG production (optional
/// sign, decimal point, exponent), and arc flags are single `0`/`1` digits
/// that need no separator from the following number.
struct Lexer<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            bytes: source.as_bytes(),
            pos: 0,
        }
    }

    fn skip_separators(&mut self) {
        while let Some(&b) = self.bytes.get(self.pos) {
            if b == b',' || b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// Next command letter and its offset, or `None` at end of input
    fn command(&mut self) -> Result<Option<(char, usize)>, ParseError> {
        self.skip_separators();
        match self.bytes.get(self.pos) {
            None => Ok(None),
            Some(&b) if b.is_ascii_alphabetic() => {
                let offset = self.pos;
                self.pos += 1;
                Ok(Some((b as char, offset)))
            }
            Some(&b) => Err(ParseError::UnexpectedCharacter {
                found: b as char,
                offset: self.pos,
            }),
        }
    }

    /// Whether the next token begins a number (an implicit repetition)
    fn starts_number(&mut self) -> bool {
        self.skip_separators();
        matches!(
            self.bytes.get(self.pos),
            Some(b'0'..=b'9' | b'+' | b'-' | b'.')
        )
    }

    fn number(&mut self) -> Result<f64, ParseError> {
        self.skip_separators();
        let start = self.pos;

        if matches!(self.bytes.get(self.pos), Some(b'+' | b'-')) {
            self.pos += 1;
        }
        let int_digits = self.digits();
        let mut frac_digits = 0;
        if self.bytes.get(self.pos) == Some(&b'.') {
            self.pos += 1;
            frac_digits = self.digits();
        }
        if int_digits == 0 && frac_digits == 0 {
            self.pos = start;
            return Err(ParseError::ExpectedNumber(start));
        }
        if matches!(self.bytes.get(self.pos), Some(b'e' | b'E')) {
            let mark = self.pos;
            self.pos += 1;
            if matches!(self.bytes.get(self.pos), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if self.digits() == 0 {
                // Not an exponent after all; leave it for the next token.
                self.pos = mark;
            }
        }

        let text = std::str::from_utf8(&self.bytes[start..self.pos])
            .expect("number tokens are ascii");
        let value: f64 = text
            .parse()
            .map_err(|_| ParseError::ExpectedNumber(start))?;
        if !value.is_finite() {
            return Err(ParseError::NonFiniteNumber(start));
        }
        Ok(value)
    }

    /// Arc flag: exactly one `0` or `1` digit
    fn flag(&mut self) -> Result<bool, ParseError> {
        self.skip_separators();
        match self.bytes.get(self.pos) {
            Some(b'0') => {
                self.pos += 1;
                Ok(false)
            }
            Some(b'1') => {
                self.pos += 1;
                Ok(true)
            }
            _ => Err(ParseError::ExpectedFlag(self.pos)),
        }
    }

    fn digits(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.bytes.get(self.pos), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        self.pos - start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::serialize;

    fn pt(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn polyline_passes_through_exactly() {
        let model = normalize("M 0 0 L 10 0 L 10 10");
        assert_eq!(
            model.commands(),
            &[
                PathCommand::MoveTo(pt(0.0, 0.0)),
                PathCommand::LineTo(pt(10.0, 0.0)),
                PathCommand::LineTo(pt(10.0, 10.0)),
            ]
        );
    }

    #[test]
    fn close_becomes_terminal_marker() {
        let model = normalize("M 0 0 L 10 0 Z");
        assert!(model.is_closed());
        assert_eq!(model.len(), 3);
    }

    #[test]
    fn horizontal_and_vertical_reuse_the_other_axis() {
        let model = normalize("M 1 2 H 10 V 20");
        assert_eq!(
            model.commands(),
            &[
                PathCommand::MoveTo(pt(1.0, 2.0)),
                PathCommand::LineTo(pt(10.0, 2.0)),
                PathCommand::LineTo(pt(10.0, 20.0)),
            ]
        );
    }

    #[test]
    fn relative_commands_offset_from_current_point() {
        let model = normalize("m 1 1 l 2 0 h 3 v -1 c 1 1, 2 1, 3 0");
        assert_eq!(
            model.commands(),
            &[
                PathCommand::MoveTo(pt(1.0, 1.0)),
                PathCommand::LineTo(pt(3.0, 1.0)),
                PathCommand::LineTo(pt(6.0, 1.0)),
                PathCommand::LineTo(pt(6.0, 0.0)),
                PathCommand::CubicTo {
                    cp1: pt(7.0, 1.0),
                    cp2: pt(8.0, 1.0),
                    to: pt(9.0, 0.0),
                },
            ]
        );
    }

    #[test]
    fn smooth_cubic_reflects_previous_control() {
        let model = normalize("M 0 0 C 10 10, 20 10, 30 0 S 50 -10, 60 0");
        let PathCommand::CubicTo { cp1, .. } = model.commands()[2] else {
            panic!("expected a cubic");
        };
        assert_eq!(cp1, pt(40.0, -10.0));
    }

    #[test]
    fn smooth_cubic_without_preceding_curve_degenerates_to_anchor() {
        let model = normalize("M 5 5 S 20 10, 30 0");
        let PathCommand::CubicTo { cp1, .. } = model.commands()[1] else {
            panic!("expected a cubic");
        };
        assert_eq!(cp1, pt(5.0, 5.0));
    }

    #[test]
    fn quadratic_is_raised_to_cubic() {
        let model = normalize("M 0 0 Q 15 30, 30 0");
        assert_eq!(
            model.commands()[1],
            PathCommand::CubicTo {
                cp1: pt(10.0, 20.0),
                cp2: pt(20.0, 20.0),
                to: pt(30.0, 0.0),
            }
        );
    }

    #[test]
    fn smooth_quadratic_reflects_the_quadratic_control() {
        // T must reflect the original quadratic control, not the raised
        // cubic handle: Q control (15, 30) about (30, 0) gives (45, -30).
        let model = normalize("M 0 0 Q 15 30, 30 0 T 60 0");
        assert_eq!(
            model.commands()[2],
            PathCommand::CubicTo {
                cp1: pt(40.0, -20.0),
                cp2: pt(50.0, -20.0),
                to: pt(60.0, 0.0),
            }
        );
    }

    #[test]
    fn arc_endpoints_are_continuous() {
        let model = normalize("M 0 0 A 50 50 0 0 1 100 0");
        assert!(model.len() >= 2);

        let mut current = Point::ORIGIN;
        for command in model.commands() {
            match *command {
                PathCommand::MoveTo(p) => current = p,
                PathCommand::CubicTo { to, .. } => current = to,
                _ => panic!("arc must normalize to cubics"),
            }
        }
        assert!((current.x - 100.0).abs() < 1e-3);
        assert!(current.y.abs() < 1e-3);
    }

    #[test]
    fn degenerate_arc_moves_the_pen_silently() {
        let model = normalize("M 0 0 A 0 50 0 0 1 100 0 L 100 10");
        assert_eq!(
            model.commands(),
            &[
                PathCommand::MoveTo(pt(0.0, 0.0)),
                PathCommand::LineTo(pt(100.0, 10.0)),
            ]
        );
    }

    #[test]
    fn unspaced_arc_flags_parse() {
        let model = normalize("M 0 0 A 50 50 0 0150 50");
        assert!(model.len() >= 2);
        let last = model.commands().last().unwrap().end_point().unwrap();
        assert!((last.x - 50.0).abs() < 1e-3);
        assert!((last.y - 50.0).abs() < 1e-3);
    }

    #[test]
    fn implicit_repetition_extends_the_command() {
        let model = normalize("M 0 0 L 1 1 2 2 3 3");
        assert_eq!(model.len(), 4);
        assert_eq!(
            model.commands()[3],
            PathCommand::LineTo(pt(3.0, 3.0))
        );
    }

    #[test]
    fn pairs_after_move_are_implicit_lines() {
        let model = normalize("M 0 0 10 0 10 10");
        assert_eq!(
            model.commands(),
            &[
                PathCommand::MoveTo(pt(0.0, 0.0)),
                PathCommand::LineTo(pt(10.0, 0.0)),
                PathCommand::LineTo(pt(10.0, 10.0)),
            ]
        );
    }

    #[test]
    fn compressed_syntax_parses() {
        let model = normalize("M0,0L10-5.5.5 1e1Z");
        assert_eq!(
            model.commands(),
            &[
                PathCommand::MoveTo(pt(0.0, 0.0)),
                PathCommand::LineTo(pt(10.0, -5.5)),
                PathCommand::LineTo(pt(0.5, 10.0)),
                PathCommand::ClosePath,
            ]
        );
    }

    #[test]
    fn garbage_yields_the_empty_model() {
        assert!(normalize("not a path").is_empty());
        assert!(normalize("M 0").is_empty());
        assert!(normalize("L 10 10").is_empty());
        assert!(normalize("M 0 0 L x y").is_empty());
        assert!(normalize("M 0 0 A 50 50 0 2 1 100 0").is_empty());
    }

    #[test]
    fn whitespace_only_input_is_the_empty_model() {
        assert!(normalize("").is_empty());
        assert!(normalize("   \n\t ").is_empty());
        assert!(try_normalize("  ").unwrap().is_empty());
    }

    #[test]
    fn commands_after_close_are_rejected() {
        assert_eq!(
            try_normalize("M 0 0 L 1 1 Z L 2 2"),
            Err(ParseError::CommandAfterClose(14))
        );
    }

    #[test]
    fn second_subpath_is_rejected() {
        assert!(matches!(
            try_normalize("M 0 0 L 1 1 M 5 5 L 6 6"),
            Err(ParseError::SecondSubpath(_))
        ));
    }

    #[test]
    fn normalize_is_idempotent_through_the_serializer() {
        let sources = [
            "M 0 0 L 10 0 L 10 10 Z",
            "M 0 0 C 10 10, 20 10, 30 0 S 50 -10, 60 0",
            "m 1 1 q 10 10, 20 0 t 20 0",
            "M 0 0 A 50 50 0 0 1 100 0",
            "M 1 2 H 10 v 5 h -3",
        ];
        for source in sources {
            let first = normalize(source);
            let second = normalize(&serialize(&first));
            assert_eq!(first, second, "round trip changed {source:?}");
        }
    }
}
