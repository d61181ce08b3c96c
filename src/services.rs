// Copyright 2025 the Pathbender Authors
// SPDX-License-Identifier: Apache-2.0

//! Explicit lifecycle for the external geometry backend.
//!
//! Boolean set operations are delegated to an external library wired in by
//! the host. Rather than a lazily-constructed module-level singleton, the
//! backend is an injected handle with explicit `init`/`dispose` and an
//! explicit unavailable state: a caller that gets `None` back falls back to
//! its own local computation (or skips the operation) instead of poking at
//! global state to find out why.

use crate::path::PathModel;

/// Boolean set operations the backend can perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    Union,
    Subtract,
    Intersect,
    Exclude,
}

/// An external geometry library, adapted by the host.
///
/// Paths cross this boundary in their serialized string form, the same
/// representation the persistence collaborators consume.
pub trait GeometryBackend {
    /// Backend name for logs
    fn name(&self) -> &'static str;

    /// Combine two canonical path strings; `None` when the backend cannot
    /// handle the input
    fn combine(&mut self, op: BooleanOp, a: &str, b: &str) -> Option<String>;
}

/// Lifecycle states of the injected backend
enum BackendState {
    /// No backend injected yet
    Idle,
    Ready(Box<dyn GeometryBackend>),
    /// Initialization failed or the backend was disposed after an error;
    /// callers fall back to local computation
    Unavailable,
}

/// Owning handle through which all backend calls flow
pub struct BackendHandle {
    state: BackendState,
}

impl BackendHandle {
    /// A handle with no backend; every operation reports unavailable
    pub fn new() -> Self {
        Self {
            state: BackendState::Idle,
        }
    }

    /// Inject a backend, replacing whatever was there
    pub fn init(&mut self, backend: Box<dyn GeometryBackend>) {
        tracing::info!(backend = backend.name(), "geometry backend ready");
        self.state = BackendState::Ready(backend);
    }

    /// Record that the backend cannot be used (failed to load, crashed)
    pub fn mark_unavailable(&mut self) {
        tracing::warn!("geometry backend unavailable; using local fallbacks");
        self.state = BackendState::Unavailable;
    }

    /// Drop the backend and return to the uninitialized state
    pub fn dispose(&mut self) {
        self.state = BackendState::Idle;
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, BackendState::Ready(_))
    }

    /// Combine two paths through the backend.
    ///
    /// `None` means "no backend answer" (not injected, unavailable, or the
    /// backend declined) and the caller computes locally instead.
    pub fn combine(&mut self, op: BooleanOp, a: &PathModel, b: &PathModel) -> Option<PathModel> {
        let BackendState::Ready(backend) = &mut self.state else {
            return None;
        };
        let combined = backend.combine(
            op,
            &crate::path::serialize(a),
            &crate::path::serialize(b),
        )?;
        Some(crate::path::normalize(&combined))
    }
}

impl Default for BackendHandle {
    fn default() -> Self {
        Self::new()
    }
}
