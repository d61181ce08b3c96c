// Copyright 2025 the Pathbender Authors
// SPDX-License-Identifier: Apache-2.0

//! Interactive node editing — handles, hit-testing, and the drag session

pub mod handle;
pub mod session;

pub use handle::{Handle, HandleKind, HandleRef};
pub use session::{CommitCallback, EditSession, LiveCallback};
