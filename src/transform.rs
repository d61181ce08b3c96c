// Copyright 2025 the Pathbender Authors
// SPDX-License-Identifier: Apache-2.0

//! Conversion between affine matrices and transform components.
//!
//! Shapes store their placement as a `kurbo::Affine`: the 2x3 coefficient
//! form `[a, b, c, d, tx, ty]` with `x' = a·x + c·y + tx`,
//! `y' = b·x + d·y + ty`. The panels edit translate/rotate/skew/scale
//! components, so this module composes components into a matrix and
//! decomposes a matrix back into components.
//!
//! Decomposition does not recover skew: `decompose` reports translation,
//! rotation, and scale only, and a matrix composed with nonzero skew folds
//! that shear into the other components. This asymmetry is long-standing
//! behavior that the transform panel relies on; see `DecomposedTransform`.

use kurbo::{Affine, Vec2};
use serde::{Deserialize, Serialize};

/// Transform components recovered from a matrix by [`decompose`].
///
/// There is deliberately no skew field: skew is never reconstructed, even
/// from matrices that [`compose`] built with nonzero skew angles.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DecomposedTransform {
    pub x: f64,
    pub y: f64,
    pub rotation_degrees: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

/// Build a matrix from components, applied in the fixed order
/// translate ∘ rotate ∘ skew ∘ scale (scale closest to the shape).
///
/// `rotation`, `skew_x`, and `skew_y` are in radians.
pub fn compose(
    translate: Vec2,
    rotation: f64,
    skew_x: f64,
    skew_y: f64,
    scale_x: f64,
    scale_y: f64,
) -> Affine {
    let skew = Affine::new([1.0, skew_y.tan(), skew_x.tan(), 1.0, 0.0, 0.0]);
    Affine::translate(translate)
        * Affine::rotate(rotation)
        * skew
        * Affine::scale_non_uniform(scale_x, scale_y)
}

/// Recover translation, rotation, and scale from a matrix.
///
/// Rotation comes from the first column's angle; scale from the column
/// lengths. A negative determinant means the matrix mirrors, which is
/// reported by negating the scale axis whose diagonal coefficient is the
/// smaller of `a` and `d`.
pub fn decompose(matrix: Affine) -> DecomposedTransform {
    let [a, b, c, d, tx, ty] = matrix.as_coeffs();

    let mut scale_x = (a * a + b * b).sqrt();
    let mut scale_y = (c * c + d * d).sqrt();
    if a * d - b * c < 0.0 {
        if a < d {
            scale_x = -scale_x;
        } else {
            scale_y = -scale_y;
        }
    }

    DecomposedTransform {
        x: tx,
        y: ty,
        rotation_degrees: b.atan2(a).to_degrees(),
        scale_x,
        scale_y,
    }
}
