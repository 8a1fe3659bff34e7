// Copyright 2025 the Curvesmith Authors
// SPDX-License-Identifier: Apache-2.0

//! Stable identifiers for path segments.
//!
//! Each `SegmentId` is a monotonically increasing `u64` generated from a
//! global atomic counter. The selection stores ids rather than positions, so
//! inserting or deleting anchors never shifts what is selected. Ids are never
//! reused within a process; a deleted segment leaves no dangling reference.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// A unique identifier for a segment of a curve path
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentId(u64);

static SEGMENT_COUNTER: AtomicU64 = AtomicU64::new(1);

impl SegmentId {
    /// Create a new unique segment ID
    pub fn next() -> Self {
        Self(SEGMENT_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SegmentId {
    fn default() -> Self {
        Self::next()
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seg#{}", self.0)
    }
}
