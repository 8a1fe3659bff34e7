// Copyright 2025 the Curvesmith Authors
// SPDX-License-Identifier: Apache-2.0

//! The editable curve: an x-ordered chain of anchors with Bezier handles.
//!
//! A `CurvePath` always spans the domain [0, domain]. Its first anchor sits
//! at x = 0 and its last at x = domain; those two are never removed and the
//! editor never moves them horizontally. Interior anchors are kept in
//! ascending x order, which is what makes the compiled curve a function.
//!
//! Handles are stored relative to their anchor. A zero handle means that
//! side of the anchor is a straight line.
//!
//! For change detection the path is serialized into a JSON snapshot of
//! [`SegmentRecord`]s. Segment ids are not part of the snapshot, so two
//! paths with the same geometry have the same fingerprint.

use super::entity_id::SegmentId;
use crate::error::CurveError;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

// ============================================================================
// SEGMENTS
// ============================================================================

/// Which handle of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HandleSide {
    /// The handle pointing toward the previous anchor
    In,
    /// The handle pointing toward the next anchor
    Out,
}

impl HandleSide {
    /// The other handle of the same segment
    pub fn opposite(self) -> Self {
        match self {
            HandleSide::In => HandleSide::Out,
            HandleSide::Out => HandleSide::In,
        }
    }
}

/// An anchor point with its two handles
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub id: SegmentId,
    /// Absolute anchor position
    pub point: Point,
    /// Incoming handle, relative to `point`
    pub handle_in: Vec2,
    /// Outgoing handle, relative to `point`
    pub handle_out: Vec2,
}

impl Segment {
    /// A linear anchor (both handles zero)
    pub fn new(point: Point) -> Self {
        Self::with_handles(point, Vec2::ZERO, Vec2::ZERO)
    }

    /// An anchor with explicit handles
    pub fn with_handles(point: Point, handle_in: Vec2, handle_out: Vec2) -> Self {
        Self {
            id: SegmentId::next(),
            point,
            handle_in,
            handle_out,
        }
    }

    /// The relative handle vector on one side
    pub fn handle(&self, side: HandleSide) -> Vec2 {
        match side {
            HandleSide::In => self.handle_in,
            HandleSide::Out => self.handle_out,
        }
    }

    /// Replace the relative handle vector on one side
    pub fn set_handle(&mut self, side: HandleSide, handle: Vec2) {
        match side {
            HandleSide::In => self.handle_in = handle,
            HandleSide::Out => self.handle_out = handle,
        }
    }

    /// Absolute position of a handle
    pub fn handle_point(&self, side: HandleSide) -> Point {
        self.point + self.handle(side)
    }

    /// Both handles are zero
    pub fn is_linear(&self) -> bool {
        is_zero(self.handle_in) && is_zero(self.handle_out)
    }

    /// At least one handle is non-zero
    pub fn is_partially_smooth(&self) -> bool {
        !is_zero(self.handle_in) || !is_zero(self.handle_out)
    }

    /// At least one handle is zero
    pub fn is_partially_linear(&self) -> bool {
        is_zero(self.handle_in) || is_zero(self.handle_out)
    }

    /// Collapse both handles onto the anchor
    pub fn make_linear(&mut self) {
        self.handle_in = Vec2::ZERO;
        self.handle_out = Vec2::ZERO;
    }

    fn record(&self) -> SegmentRecord {
        SegmentRecord {
            point: self.point,
            handle_in: self.handle_in,
            handle_out: self.handle_out,
        }
    }
}

/// Whether a handle vector has zero length
pub fn is_zero(handle: Vec2) -> bool {
    handle.length() == 0.0
}

/// Serializable geometry of one segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentRecord {
    pub point: Point,
    #[serde(default)]
    pub handle_in: Vec2,
    #[serde(default)]
    pub handle_out: Vec2,
}

/// Content fingerprint of a path (its JSON snapshot)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// The serialized snapshot
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// PATH
// ============================================================================

/// An x-monotonic chain of segments over [0, domain]
#[derive(Debug, Clone, PartialEq)]
pub struct CurvePath {
    segments: Vec<Segment>,
    domain: f64,
}

impl CurvePath {
    /// The straight diagonal from (0, 0) to (domain, domain)
    pub fn new(domain: f64) -> Self {
        Self {
            segments: vec![
                Segment::new(Point::new(0.0, 0.0)),
                Segment::new(Point::new(domain, domain)),
            ],
            domain,
        }
    }

    /// A path without any segments
    pub fn empty(domain: f64) -> Self {
        Self {
            segments: Vec::new(),
            domain,
        }
    }

    /// Build a path from segments that are already in x order
    pub fn from_segments(segments: Vec<Segment>, domain: f64) -> Self {
        Self { segments, domain }
    }

    /// Build a path from snapshot records, assigning fresh ids
    pub fn from_records(records: &[SegmentRecord], domain: f64) -> Self {
        let segments = records
            .iter()
            .map(|r| Segment::with_handles(r.point, r.handle_in, r.handle_out))
            .collect();
        Self { segments, domain }
    }

    /// Parse a JSON snapshot (an array of segment records)
    pub fn from_json(json: &str, domain: f64) -> serde_json::Result<Self> {
        let records: Vec<SegmentRecord> = serde_json::from_str(json)?;
        Ok(Self::from_records(&records, domain))
    }

    /// Snapshot records in x order
    pub fn records(&self) -> Vec<SegmentRecord> {
        self.segments.iter().map(Segment::record).collect()
    }

    /// Serialize the snapshot as JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.records())
    }

    /// Content fingerprint used to decide whether a recompile is needed
    pub fn fingerprint(&self) -> Fingerprint {
        // Records are plain numbers; serialization only fails for custom
        // serializers, which this type does not use.
        Fingerprint(self.to_json().unwrap_or_default())
    }

    /// Upper bound of the x domain
    pub fn domain(&self) -> f64 {
        self.domain
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the path has no segments
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segments in x order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Consecutive anchor pairs (the joints of the curve)
    pub fn joints(&self) -> impl Iterator<Item = (&Segment, &Segment)> {
        self.segments.windows(2).map(|pair| (&pair[0], &pair[1]))
    }

    /// The x span of every joint, in order
    pub fn x_ranges(&self) -> Vec<(f64, f64)> {
        self.joints().map(|(a, b)| (a.point.x, b.point.x)).collect()
    }

    /// Position of a segment in x order
    pub fn index_of(&self, id: SegmentId) -> Option<usize> {
        self.segments.iter().position(|s| s.id == id)
    }

    /// Look up a segment by id
    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id == id)
    }

    /// Look up a segment by id for mutation
    pub fn get_mut(&mut self, id: SegmentId) -> Option<&mut Segment> {
        self.segments.iter_mut().find(|s| s.id == id)
    }

    /// Whether `id` is the pinned first segment
    pub fn is_first(&self, id: SegmentId) -> bool {
        self.segments.first().is_some_and(|s| s.id == id)
    }

    /// Whether `id` is the pinned last segment
    pub fn is_last(&self, id: SegmentId) -> bool {
        self.segments.last().is_some_and(|s| s.id == id)
    }

    /// Whether `id` is one of the two pinned endpoints
    pub fn is_endpoint(&self, id: SegmentId) -> bool {
        self.is_first(id) || self.is_last(id)
    }

    /// The segment before `id`
    pub fn previous(&self, id: SegmentId) -> Option<&Segment> {
        let index = self.index_of(id)?;
        index.checked_sub(1).and_then(|i| self.segments.get(i))
    }

    /// The segment after `id`
    pub fn next(&self, id: SegmentId) -> Option<&Segment> {
        let index = self.index_of(id)?;
        self.segments.get(index + 1)
    }

    /// Insert a linear anchor after the nearest anchor to its left
    ///
    /// The first anchor is the fallback, so a point left of every anchor
    /// still lands after it and the pinned start stays first.
    pub fn insert(&mut self, point: Point) -> Result<SegmentId, CurveError> {
        let first = self.segments.first().ok_or(CurveError::EmptyPath)?;

        let mut nearest = 0;
        let mut distance = point.x - first.point.x;
        for (index, segment) in self.segments.iter().enumerate() {
            let d = point.x - segment.point.x;
            if d > 0.0 && d < distance {
                nearest = index;
                distance = d;
            }
        }

        let segment = Segment::new(point);
        let id = segment.id;
        self.segments.insert(nearest + 1, segment);
        tracing::debug!(
            "[CurvePath::insert] {} at ({}, {}), index {}",
            id,
            point.x,
            point.y,
            nearest + 1
        );
        Ok(id)
    }

    /// Remove an interior segment
    ///
    /// Returns false (and leaves the path alone) for the endpoints and for
    /// unknown ids.
    pub fn remove(&mut self, id: SegmentId) -> bool {
        if self.is_endpoint(id) {
            return false;
        }
        match self.index_of(id) {
            Some(index) => {
                self.segments.remove(index);
                true
            }
            None => false,
        }
    }

    /// Closest anchor or handle point to `target`, if closer than `threshold`
    ///
    /// Zero-length handles are skipped since they coincide with their
    /// anchor.
    pub fn nearest_point(&self, target: Point, threshold: f64) -> Option<Point> {
        let mut candidates = self.segments.iter().flat_map(|s| {
            let handle_in = (!is_zero(s.handle_in)).then(|| s.handle_point(HandleSide::In));
            let handle_out = (!is_zero(s.handle_out)).then(|| s.handle_point(HandleSide::Out));
            handle_in.into_iter().chain(handle_out).chain(Some(s.point))
        });

        let seed = candidates.next()?;
        let (nearest, distance) = candidates.fold((seed, seed.distance(target)), |best, p| {
            let d = p.distance(target);
            if d < best.1 { (p, d) } else { best }
        });

        (distance < threshold).then_some(nearest)
    }

    /// The x interval the anchor `id` may occupy while the anchors accepted
    /// by `moving` are dragged along with it
    ///
    /// The interval runs to the nearest neighbour on each side that stays
    /// put. Endpoints always stay put.
    pub fn x_bounds(
        &self,
        id: SegmentId,
        moving: impl Fn(SegmentId) -> bool,
    ) -> Option<(f64, f64)> {
        let index = self.index_of(id)?;
        let last = self.segments.len() - 1;
        let fixed = |i: usize| i == 0 || i == last || !moving(self.segments[i].id);
        let low = (0..index)
            .rev()
            .find(|&i| fixed(i))
            .map_or(0.0, |i| self.segments[i].point.x);
        let high = (index + 1..=last)
            .find(|&i| fixed(i))
            .map_or(self.domain, |i| self.segments[i].point.x);
        Some((low, high))
    }

    /// A copy scaled so the domain becomes [0, 1]
    ///
    /// Ids are kept, so selections still refer to the same segments.
    pub fn normalized(&self) -> CurvePath {
        if self.domain == 1.0 {
            return self.clone();
        }
        let scale = 1.0 / self.domain;
        let segments = self
            .segments
            .iter()
            .map(|s| Segment {
                id: s.id,
                point: Point::new(s.point.x * scale, s.point.y * scale),
                handle_in: s.handle_in * scale,
                handle_out: s.handle_out * scale,
            })
            .collect();
        CurvePath {
            segments,
            domain: 1.0,
        }
    }
}

impl Default for CurvePath {
    fn default() -> Self {
        Self::new(1.0)
    }
}
