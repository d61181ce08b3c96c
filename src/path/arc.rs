// Copyright 2025 the Pathbender Authors
// SPDX-License-Identifier: Apache-2.0

//! Elliptical arc to cubic bezier decomposition.
//!
//! Path strings describe arcs by their endpoints (the SVG `A` form); the
//! canonical model only carries cubics. Conversion goes through the standard
//! center parameterization: solve for the ellipse center and the start/delta
//! angles, then split the sweep into segments of at most a quarter turn and
//! approximate each with one cubic whose control points are scaled along the
//! unit tangents at the segment ends.

use kurbo::{Point, Vec2};
use std::f64::consts::{FRAC_PI_2, PI};

use super::PathCommand;

/// Center parameterization of an elliptical arc.
struct CenterParams {
    center: Point,
    radii: Vec2,
    /// Angle of the start point on the ellipse
    theta1: f64,
    /// Signed sweep to the end point
    delta_theta: f64,
}

/// Convert one endpoint-parameterized arc into cubic segments.
///
/// `x_rotation` is the ellipse's x-axis rotation in degrees; `large_arc` and
/// `sweep` are the two SVG arc flags. Degenerate input (a zero radius or a
/// zero-length chord) yields an empty list, which callers treat as "nothing
/// to draw", not as an error. Otherwise the returned `CubicTo` commands chain
/// from `from` to `to` within floating tolerance.
pub fn arc_to_cubics(
    from: Point,
    rx: f64,
    ry: f64,
    x_rotation: f64,
    large_arc: bool,
    sweep: bool,
    to: Point,
) -> Vec<PathCommand> {
    let phi = x_rotation.to_radians();
    let Some(params) = center_parameterization(from, rx, ry, phi, large_arc, sweep, to) else {
        return Vec::new();
    };

    // Split the sweep so each cubic covers at most 90 degrees.
    let segments = (params.delta_theta.abs() / FRAC_PI_2).ceil().max(1.0);
    let step = params.delta_theta / segments;

    let mut commands = Vec::with_capacity(segments as usize);
    for i in 0..segments as usize {
        let th0 = params.theta1 + step * i as f64;
        commands.push(segment_to_cubic(&params, phi, th0, th0 + step));
    }
    commands
}

/// Solve for the ellipse center and sweep angles.
///
/// Follows the W3C endpoint-to-center conversion notes: translate the origin
/// to the chord midpoint, rotate into the ellipse frame, scale the radii up
/// if the endpoints demand more ellipse than given, then pick the center
/// whose sweep direction matches the flags. Returns `None` for degenerate
/// radii or a zero-length chord.
fn center_parameterization(
    from: Point,
    rx: f64,
    ry: f64,
    phi: f64,
    large_arc: bool,
    sweep: bool,
    to: Point,
) -> Option<CenterParams> {
    let mut rx = rx.abs();
    let mut ry = ry.abs();
    if rx * rx < f64::EPSILON || ry * ry < f64::EPSILON {
        return None;
    }

    let (sin_phi, cos_phi) = phi.sin_cos();

    // Midpoint frame coordinates (x1', y1').
    let mid_x = (from.x - to.x) / 2.0;
    let mid_y = (from.y - to.y) / 2.0;
    let x1p = cos_phi * mid_x + sin_phi * mid_y;
    let y1p = -sin_phi * mid_x + cos_phi * mid_y;

    // Scale the radii up if no ellipse of the given radii reaches both
    // endpoints.
    let lambda = (x1p / rx).powi(2) + (y1p / ry).powi(2);
    if lambda > 1.0 {
        let scale = lambda.sqrt();
        rx *= scale;
        ry *= scale;
    }

    let d = (rx * y1p).powi(2) + (ry * x1p).powi(2);
    if d == 0.0 {
        // Both endpoints coincide with the midpoint: zero-length chord.
        return None;
    }
    let mut k = ((rx * ry).powi(2) / d - 1.0).abs().sqrt();
    if sweep == large_arc {
        k = -k;
    }
    let cxp = k * rx * y1p / ry;
    let cyp = -k * ry * x1p / rx;

    let center = Point::new(
        cos_phi * cxp - sin_phi * cyp + (from.x + to.x) / 2.0,
        sin_phi * cxp + cos_phi * cyp + (from.y + to.y) / 2.0,
    );

    // Start angle from the unit vector to the start point.
    let ux = (x1p - cxp) / rx;
    let uy = (y1p - cyp) / ry;
    let u_len = (ux * ux + uy * uy).sqrt();
    if u_len == 0.0 {
        return None;
    }
    let mut theta1 = (ux / u_len).clamp(-1.0, 1.0).acos();
    if uy < 0.0 {
        theta1 = -theta1;
    }

    // Delta angle between the start and end vectors, sign-corrected so the
    // sweep flag decides the direction around the ellipse.
    let vx = (-x1p - cxp) / rx;
    let vy = (-y1p - cyp) / ry;
    let v_len = (vx * vx + vy * vy).sqrt();
    if v_len == 0.0 {
        return None;
    }
    let mut delta_theta = ((ux * vx + uy * vy) / (u_len * v_len))
        .clamp(-1.0, 1.0)
        .acos();
    if ux * vy - uy * vx < 0.0 {
        delta_theta = -delta_theta;
    }
    if sweep && delta_theta < 0.0 {
        delta_theta += 2.0 * PI;
    } else if !sweep && delta_theta > 0.0 {
        delta_theta -= 2.0 * PI;
    }

    Some(CenterParams {
        center,
        radii: Vec2::new(rx, ry),
        theta1,
        delta_theta,
    })
}

/// One cubic covering the elliptical sweep from `th0` to `th1`.
///
/// Control points sit at distance `t = (8/3)·sin²(Δ/4)/sin(Δ/2)` along the
/// unit tangents at the segment ends, mapped back out of the ellipse frame.
fn segment_to_cubic(params: &CenterParams, phi: f64, th0: f64, th1: f64) -> PathCommand {
    let (rx, ry) = (params.radii.x, params.radii.y);
    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_th0, cos_th0) = th0.sin_cos();
    let (sin_th1, cos_th1) = th1.sin_cos();

    let th_half = 0.5 * (th1 - th0);
    let t = (8.0 / 3.0) * (th_half * 0.5).sin().powi(2) / th_half.sin();

    let x1 = rx * (cos_th0 - t * sin_th0);
    let y1 = ry * (sin_th0 + t * cos_th0);
    let x3 = rx * cos_th1;
    let y3 = ry * sin_th1;
    let x2 = x3 + rx * (t * sin_th1);
    let y2 = y3 - ry * (t * cos_th1);

    let unrotate = |x: f64, y: f64| {
        Point::new(
            params.center.x + cos_phi * x - sin_phi * y,
            params.center.y + sin_phi * x + cos_phi * y,
        )
    };

    PathCommand::CubicTo {
        cp1: unrotate(x1, y1),
        cp2: unrotate(x2, y2),
        to: unrotate(x3, y3),
    }
}
