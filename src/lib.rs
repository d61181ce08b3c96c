// Copyright 2025 the Pathbender Authors
// SPDX-License-Identifier: Apache-2.0

//! Pathbender: the path geometry core of a 2D vector editor.
//!
//! Everything here is the math under the editor's hands: path strings
//! normalize into a canonical cubic form (`path`), the canonical form is
//! edited anchor-by-anchor during drag gestures (`editing`), shapes place
//! themselves with affine components (`transform`), and the renderer culls
//! and hit-tests through a per-frame quadtree (`spatial`). Rendering, undo,
//! persistence, and boolean ops live in host collaborators; they talk to
//! this crate through serialized path strings and bounding-rect queries.

pub mod editing;
pub mod path;
pub mod services;
pub mod spatial;
pub mod transform;

pub use editing::{EditSession, Handle, HandleKind, HandleRef};
pub use path::{ParseError, PathCommand, PathModel, normalize, serialize};
pub use spatial::{IndexEntry, SpatialIndex};
pub use transform::{DecomposedTransform, compose, decompose};

/// Initialize tracing output for host binaries and examples (controlled via
/// the RUST_LOG env var). Library consumers that install their own
/// subscriber should skip this.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pathbender=info".parse().unwrap()),
        )
        .init();
}
