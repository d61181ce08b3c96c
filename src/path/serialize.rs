// Copyright 2025 the Pathbender Authors
// SPDX-License-Identifier: Apache-2.0

//! Canonical model to path string — the inverse of the normalizer's parse.
//!
//! Output is always canonical: absolute coordinates, only `M L C Z`,
//! space-joined, with `C cp1x cp1y, cp2x cp2y, x y` for cubic segments.
//! Coordinates print in `f64`'s shortest round-trip form, so re-parsing the
//! string reproduces the exact command sequence.

use std::fmt::Write;

use super::{PathCommand, PathModel};

/// Serialize a model to its persisted string form. Never fails; the empty
/// model serializes to the empty string.
pub fn serialize(model: &PathModel) -> String {
    let mut out = String::new();
    for command in model.commands() {
        if !out.is_empty() {
            out.push(' ');
        }
        match *command {
            PathCommand::MoveTo(p) => {
                write!(out, "M {} {}", p.x, p.y).expect("writing to a String");
            }
            PathCommand::LineTo(p) => {
                write!(out, "L {} {}", p.x, p.y).expect("writing to a String");
            }
            PathCommand::CubicTo { cp1, cp2, to } => {
                write!(
                    out,
                    "C {} {}, {} {}, {} {}",
                    cp1.x, cp1.y, cp2.x, cp2.y, to.x, to.y
                )
                .expect("writing to a String");
            }
            PathCommand::ClosePath => out.push('Z'),
        }
    }
    out
}
