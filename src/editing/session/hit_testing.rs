// Copyright 2025 the Curvesmith Authors
// SPDX-License-Identifier: Apache-2.0

//! Hit testing and hover feedback for EditSession

use super::{Cursor, EditSession};
use crate::editing::mouse::Modifiers;
use crate::editing::selection::{Part, SelectedItem};
use crate::model::SegmentId;
use crate::model::path::{HandleSide, is_zero};
use kurbo::Point;

/// The anchor or handle under the pointer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitTestResult {
    pub item: SelectedItem,
    /// Absolute position of the hit item
    pub point: Point,
    pub distance: f64,
}

/// Closest candidate within `max_dist`; earlier candidates win ties
fn find_closest(
    pos: Point,
    candidates: impl Iterator<Item = (SelectedItem, Point)>,
    max_dist: f64,
) -> Option<HitTestResult> {
    let mut best: Option<HitTestResult> = None;
    for (item, point) in candidates {
        let distance = point.distance(pos);
        if distance > max_dist {
            continue;
        }
        if best.is_none_or(|b| distance < b.distance) {
            best = Some(HitTestResult {
                item,
                point,
                distance,
            });
        }
    }
    best
}

impl EditSession {
    /// Absolute position of a selectable item
    pub fn point_of(&self, item: &SelectedItem) -> Option<Point> {
        let segment = self.path.get(item.segment)?;
        Some(match item.part.side() {
            Some(side) => segment.handle_point(side),
            None => segment.point,
        })
    }

    /// The anchor or non-zero handle nearest to `pos`, within the hit radius
    pub fn hit_test(&self, pos: Point) -> Option<HitTestResult> {
        let max_dist = self.settings.hit_radius();
        let candidates = self.path.segments().iter().flat_map(|s| {
            let handles = [HandleSide::In, HandleSide::Out]
                .into_iter()
                .filter(|&side| !is_zero(s.handle(side)))
                .map(|side| (SelectedItem::handle(s.id, side), s.handle_point(side)));
            std::iter::once((SelectedItem::anchor(s.id), s.point)).chain(handles)
        });

        let result = find_closest(pos, candidates, max_dist);
        match &result {
            Some(hit) => tracing::debug!(
                "[hit_test] {} {:?} at distance {}",
                hit.item.segment,
                hit.item.part,
                hit.distance
            ),
            None => tracing::debug!("[hit_test] no hit at ({}, {})", pos.x, pos.y),
        }
        result
    }

    /// Update the cursor hint for a pointer hovering at `pos`
    pub fn hover(&mut self, pos: Point, mods: Modifiers) -> Cursor {
        let near_path = self
            .path
            .nearest_point(pos, self.settings.hit_radius())
            .is_some();
        self.cursor = if self.is_mouse_down || near_path {
            Cursor::Grabbing
        } else if mods.adds_to_selection() {
            Cursor::Copy
        } else {
            Cursor::Crosshair
        };
        self.cursor
    }

    /// Whether `part` of the segment is currently selected
    pub fn is_selected(&self, segment: SegmentId, part: Part) -> bool {
        self.selection.contains(&SelectedItem { segment, part })
    }
}
