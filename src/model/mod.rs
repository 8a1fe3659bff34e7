// Copyright 2025 the Curvesmith Authors
// SPDX-License-Identifier: Apache-2.0

//! Curve data model

pub mod entity_id;
pub mod path;

pub use entity_id::SegmentId;
pub use path::{CurvePath, Fingerprint, HandleSide, Segment, SegmentRecord};
