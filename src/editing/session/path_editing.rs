// Copyright 2025 the Curvesmith Authors
// SPDX-License-Identifier: Apache-2.0

//! Path editing methods for EditSession: dragging, handle constraints,
//! smoothing, insertion and deletion

use super::{EditSession, GridDensity};
use crate::editing::mouse::MouseEvent;
use crate::editing::selection::SelectedItem;
use crate::error::CurveError;
use crate::model::{HandleSide, Segment, SegmentId};
use kurbo::{Line, Point, Vec2};

/// Snap a point to the nearest of `cells` grid divisions of the domain
pub fn snap_to_grid(point: Point, domain: f64, cells: u32) -> Point {
    if cells == 0 || domain <= 0.0 {
        return point;
    }
    let cells = f64::from(cells);
    Point::new(
        (point.x / domain * cells).round() / cells * domain,
        (point.y / domain * cells).round() / cells * domain,
    )
}

/// The relative handle that gets as close to `target` as the domain allows
///
/// Targets inside [0, domain] are taken as is. Otherwise the handle is cut
/// where the line from the anchor to the target crosses the exceeded
/// bound. If there is no such crossing the handle keeps its current value.
pub fn clamp_handle(segment: &Segment, side: HandleSide, target: Point, domain: f64) -> Vec2 {
    if (0.0..=domain).contains(&target.x) {
        return target - segment.point;
    }

    let x_limit = if target.x > domain { domain } else { 0.0 };
    let reach = Line::new(segment.point, target);
    let bound = Line::new((x_limit, -1.0), (x_limit, 1.0));
    let (low, high) = if segment.point.x <= target.x {
        (segment.point.x, target.x)
    } else {
        (target.x, segment.point.x)
    };

    match reach.crossing_point(bound) {
        Some(mut crossing) if crossing.x >= low && crossing.x <= high => {
            crossing.x = crossing.x.clamp(0.0, domain);
            crossing - segment.point
        }
        _ => segment.handle(side),
    }
}

/// Point the handle opposite `leader` away from it, clamped to the domain
pub fn mirror_handle(segment: &mut Segment, leader: HandleSide, domain: f64) {
    let follower = leader.opposite();
    let target = segment.point - segment.handle(leader);
    let handle = clamp_handle(segment, follower, target, domain);
    segment.set_handle(follower, handle);
}

/// `direction` scaled to `length`, or zero for a zero direction
fn with_length(direction: Vec2, length: f64) -> Vec2 {
    if direction.length() == 0.0 {
        Vec2::ZERO
    } else {
        direction.normalize() * length
    }
}

impl EditSession {
    /// Remember where every selected item is, as the origin of a drag
    pub fn freeze_selection(&mut self) {
        let mut selection = std::mem::take(&mut self.selection);
        selection.freeze(|item| self.point_of(item));
        self.selection = selection;
    }

    /// Move the selection by the pointer offset since the last press
    ///
    /// Items move from their frozen points, so the path only depends on the
    /// latest event. Anchors stay between the nearest unselected anchors on
    /// either side, which never move. Ctrl snaps to the fine grid, alt
    /// mirrors dragged handles.
    pub fn transform_selection(&mut self, event: &MouseEvent) {
        let Some(press) = self.last_press else {
            return;
        };
        if self.selection.is_empty() {
            return;
        }

        let delta = event.pos - press.pos;
        let snapping = event.mods.snaps_to_grid();
        self.grid = if snapping {
            GridDensity::Fine
        } else {
            GridDensity::Coarse
        };
        let domain = self.path.domain();
        let cells = self.settings.snap_cells;

        let moves: Vec<(SelectedItem, Point)> = self
            .selection
            .iter()
            .filter_map(|item| self.selection.frozen(item).map(|p| (*item, p)))
            .collect();

        for (item, frozen) in moves {
            let mut target = frozen + delta;
            if snapping {
                target = snap_to_grid(target, domain, cells);
            }
            let is_first = self.path.is_first(item.segment);
            let is_last = self.path.is_last(item.segment);
            let selection = &self.selection;
            let (low, high) = self
                .path
                .x_bounds(item.segment, |id| selection.contains(&SelectedItem::anchor(id)))
                .unwrap_or((0.0, domain));
            let Some(segment) = self.path.get_mut(item.segment) else {
                continue;
            };

            match item.part.side() {
                Some(side) => {
                    let handle = clamp_handle(segment, side, target, domain);
                    segment.set_handle(side, handle);
                    if event.mods.exclusive_edit() {
                        mirror_handle(segment, side, domain);
                    }
                }
                None => {
                    let x = if is_first {
                        0.0
                    } else if is_last {
                        domain
                    } else {
                        target.x.max(low).min(high)
                    };
                    segment.point = Point::new(x, target.y);
                }
            }
        }
    }

    /// Smooth linear anchors, or flatten them if any is already curved
    ///
    /// Applies to the selected anchors. Endpoints get a single handle
    /// pointing at their neighbour; interior anchors get Catmull-Rom
    /// tangents. Returns false when no anchor is selected.
    pub fn toggle_smoothing(&mut self) -> bool {
        let anchors: Vec<SegmentId> = self.selection.anchors().collect();
        if anchors.is_empty() {
            return false;
        }

        let only_linear = anchors
            .iter()
            .filter_map(|id| self.path.get(*id))
            .all(Segment::is_linear);
        let domain = self.path.domain();
        let length = self.settings.smoothing_handle_ratio * domain;

        for id in anchors {
            if !only_linear {
                if let Some(segment) = self.path.get_mut(id) {
                    segment.make_linear();
                }
                self.selection.remove(&SelectedItem::handle(id, HandleSide::In));
                self.selection.remove(&SelectedItem::handle(id, HandleSide::Out));
                continue;
            }

            let previous = self.path.previous(id).map(|s| s.point);
            let next = self.path.next(id).map(|s| s.point);
            let Some(segment) = self.path.get_mut(id) else {
                continue;
            };
            match (previous, next) {
                (None, Some(next)) => {
                    segment.handle_out = with_length(next - segment.point, length);
                }
                (Some(previous), None) => {
                    segment.handle_in = with_length(previous - segment.point, length);
                }
                (Some(previous), Some(next)) => {
                    let tangent = (next - previous) / 6.0;
                    let (ahead, behind) = (segment.point + tangent, segment.point - tangent);
                    segment.handle_out = clamp_handle(segment, HandleSide::Out, ahead, domain);
                    segment.handle_in = clamp_handle(segment, HandleSide::In, behind, domain);
                }
                (None, None) => {}
            }
        }

        tracing::debug!(
            "[toggle_smoothing] {} selected anchors",
            if only_linear { "smoothed" } else { "flattened" }
        );
        true
    }

    /// Delete every selected interior anchor
    ///
    /// Endpoints stay. Returns the number of anchors removed.
    pub fn delete_selection(&mut self) -> usize {
        let doomed: Vec<SegmentId> = self
            .selection
            .anchors()
            .filter(|id| !self.path.is_endpoint(*id))
            .collect();

        let mut removed = 0;
        for id in doomed {
            if self.path.remove(id) {
                self.selection.remove_segment(id);
                removed += 1;
            }
        }

        if removed > 0 {
            tracing::debug!("[delete_selection] removed {} anchors", removed);
            self.settle();
        }
        removed
    }

    /// Insert a linear anchor at `point` and make it the only selection
    pub fn insert_point(&mut self, point: Point, now_ms: u64) -> Result<SegmentId, CurveError> {
        let point = Point::new(point.x.clamp(0.0, self.path.domain()), point.y);
        let id = self.path.insert(point)?;
        self.selection.clear();
        self.selection.insert(SelectedItem::anchor(id), now_ms);
        self.settle();
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::mouse::{Modifiers, MouseButton};
    use crate::model::CurvePath;
    use crate::settings::EditorSettings;

    fn assert_near(actual: Vec2, expected: Vec2) {
        assert!(
            (actual - expected).hypot() < 1e-9,
            "expected {expected:?}, got {actual:?}"
        );
    }

    fn three_anchor_session() -> (EditSession, SegmentId) {
        let mut session = EditSession::default();
        let mid = session.insert_point(Point::new(0.5, 0.5), 0).unwrap();
        (session, mid)
    }

    fn event(x: f64, y: f64, mods: Modifiers) -> MouseEvent {
        MouseEvent::with_modifiers(Point::new(x, y), Some(MouseButton::Left), mods)
    }

    #[test]
    fn snap_rounds_to_grid_cells() {
        assert_eq!(
            snap_to_grid(Point::new(0.53, 0.2), 1.0, 16),
            Point::new(0.5, 0.1875)
        );
        assert_eq!(
            snap_to_grid(Point::new(130.0, 90.0), 400.0, 4),
            Point::new(100.0, 100.0)
        );
    }

    #[test]
    fn clamp_keeps_in_bounds_targets() {
        let segment = Segment::new(Point::new(0.5, 0.5));
        let handle = clamp_handle(&segment, HandleSide::Out, Point::new(0.7, 0.2), 1.0);
        assert_near(handle, Vec2::new(0.2, -0.3));
    }

    #[test]
    fn clamp_cuts_at_upper_bound() {
        let segment = Segment::new(Point::new(0.9, 0.5));
        let handle = clamp_handle(&segment, HandleSide::Out, Point::new(1.3, 0.9), 1.0);
        assert_near(handle, Vec2::new(0.1, 0.1));
    }

    #[test]
    fn clamp_cuts_at_lower_bound() {
        let segment = Segment::new(Point::new(0.1, 0.5));
        let handle = clamp_handle(&segment, HandleSide::In, Point::new(-0.1, 0.3), 1.0);
        assert_near(handle, Vec2::new(-0.1, -0.1));
    }

    #[test]
    fn clamp_without_crossing_keeps_previous_handle() {
        let segment =
            Segment::with_handles(Point::new(0.5, 0.5), Vec2::new(-0.1, 0.0), Vec2::ZERO);
        let handle = clamp_handle(&segment, HandleSide::In, Point::new(f64::NAN, 0.3), 1.0);
        assert_eq!(handle, Vec2::new(-0.1, 0.0));
    }

    #[test]
    fn mirror_points_follower_the_other_way() {
        let mut segment =
            Segment::with_handles(Point::new(0.5, 0.5), Vec2::new(-0.2, 0.1), Vec2::ZERO);
        mirror_handle(&mut segment, HandleSide::In, 1.0);
        assert_near(segment.handle_out, Vec2::new(0.2, -0.1));
    }

    #[test]
    fn mirror_is_clamped_to_domain() {
        let mut segment =
            Segment::with_handles(Point::new(0.9, 0.5), Vec2::new(-0.4, -0.4), Vec2::ZERO);
        mirror_handle(&mut segment, HandleSide::In, 1.0);
        assert_near(segment.handle_out, Vec2::new(0.1, 0.1));
    }

    #[test]
    fn drag_moves_from_frozen_points() {
        let (mut session, mid) = three_anchor_session();
        session.mouse_down(event(0.5, 0.5, Modifiers::NONE));

        let drag = event(0.6, 0.7, Modifiers::NONE);
        session.mouse_drag(drag);
        let once = session.path.clone();
        session.mouse_drag(drag);
        assert_eq!(session.path, once);

        let moved = session.path.get(mid).unwrap().point;
        assert!((moved - Point::new(0.6, 0.7)).hypot() < 1e-9);
    }

    #[test]
    fn drag_result_ignores_earlier_moves() {
        let mut session = EditSession::default();
        let left = session.insert_point(Point::new(0.4, 0.4), 0).unwrap();
        let right = session.insert_point(Point::new(0.6, 0.6), 0).unwrap();
        let start = session.path.clone();

        session.mouse_down(event(0.4, 0.4, Modifiers::NONE));
        session.mouse_drag(event(0.5, 0.4, Modifiers::NONE));
        let direct = session.path.clone();

        session.path = start;
        session.mouse_down(event(0.4, 0.4, Modifiers::NONE));
        session.mouse_drag(event(0.9, 0.4, Modifiers::NONE));
        assert_eq!(session.path.get(left).unwrap().point.x, 0.6);
        assert_eq!(session.path.get(right).unwrap().point.x, 0.6);
        session.mouse_drag(event(0.5, 0.4, Modifiers::NONE));

        assert_eq!(session.path, direct);
        assert!((direct.get(left).unwrap().point.x - 0.5).abs() < 1e-12);
        assert_eq!(direct.get(right).unwrap().point.x, 0.6);
    }

    #[test]
    fn selected_neighbours_move_together() {
        let mut session = EditSession::default();
        let left = session.insert_point(Point::new(0.4, 0.4), 0).unwrap();
        let right = session.insert_point(Point::new(0.6, 0.6), 0).unwrap();
        session.mouse_down(event(0.4, 0.4, Modifiers::shift()));
        session.mouse_drag(event(0.7, 0.4, Modifiers::shift()));

        let left_x = session.path.get(left).unwrap().point.x;
        let right_x = session.path.get(right).unwrap().point.x;
        assert!((left_x - 0.7).abs() < 1e-12);
        assert!((right_x - 0.9).abs() < 1e-12);
    }

    #[test]
    fn endpoints_keep_their_x() {
        let mut session = EditSession::default();
        session.mouse_down(event(0.0, 0.0, Modifiers::NONE));
        session.mouse_drag(event(0.3, 0.4, Modifiers::NONE));
        let first = session.path.segments()[0].point;
        assert_eq!(first.x, 0.0);
        assert!((first.y - 0.4).abs() < 1e-12);

        session.mouse_down(event(1.0, 1.0, Modifiers::NONE));
        session.mouse_drag(event(0.5, 0.8, Modifiers::NONE));
        let last = session.path.segments()[1].point;
        assert_eq!(last.x, 1.0);
    }

    #[test]
    fn dragged_anchor_cannot_pass_its_neighbour() {
        let (mut session, mid) = three_anchor_session();
        session.mouse_down(event(0.5, 0.5, Modifiers::NONE));
        session.mouse_drag(event(1.4, 0.5, Modifiers::NONE));
        let xs: Vec<f64> = session.path.segments().iter().map(|s| s.point.x).collect();
        assert!(xs.windows(2).all(|w| w[0] <= w[1]), "{xs:?}");
        assert_eq!(session.path.get(mid).unwrap().point.x, 1.0);
    }

    #[test]
    fn ctrl_drag_snaps_and_shows_fine_grid() {
        let (mut session, mid) = three_anchor_session();
        session.mouse_down(event(0.5, 0.5, Modifiers::ctrl()).at(0));
        session.mouse_drag(event(0.53, 0.2, Modifiers::ctrl()).at(500));
        assert_eq!(session.grid, GridDensity::Fine);
        assert_eq!(session.path.get(mid).unwrap().point, Point::new(0.5, 0.1875));

        session.mouse_up(event(0.53, 0.2, Modifiers::ctrl()).at(1000));
        assert_eq!(session.grid, GridDensity::Coarse);
    }

    #[test]
    fn alt_drag_mirrors_handle() {
        let mut session = EditSession::default();
        let mid = session.insert_point(Point::new(0.5, 0.5), 0).unwrap();
        {
            let segment = session.path.get_mut(mid).unwrap();
            segment.handle_in = Vec2::new(-0.1, 0.0);
            segment.handle_out = Vec2::new(0.1, 0.0);
        }
        session.settle();

        session.mouse_down(event(0.4, 0.5, Modifiers::NONE).at(0));
        session.mouse_drag(event(0.4, 0.6, Modifiers::alt()).at(400));
        let segment = session.path.get(mid).unwrap();
        assert_near(segment.handle_in, Vec2::new(-0.1, 0.1));
        assert_near(segment.handle_out, Vec2::new(0.1, -0.1));
    }

    #[test]
    fn smoothing_toggles_linear_anchors() {
        let (mut session, mid) = three_anchor_session();
        let first = session.path.segments()[0].id;
        let last = session.path.segments()[2].id;
        for id in [first, mid, last] {
            session.selection.insert(SelectedItem::anchor(id), 0);
        }

        assert!(session.toggle_smoothing());
        let length = 0.1;
        let diagonal = Vec2::new(1.0, 1.0).normalize() * length;
        assert_near(session.path.get(first).unwrap().handle_out, diagonal);
        assert_near(session.path.get(last).unwrap().handle_in, -diagonal);
        let middle = session.path.get(mid).unwrap();
        assert_near(middle.handle_out, Vec2::new(1.0, 1.0) / 6.0);
        assert_near(middle.handle_in, Vec2::new(-1.0, -1.0) / 6.0);

        session
            .selection
            .insert(SelectedItem::handle(mid, HandleSide::Out), 0);
        assert!(session.toggle_smoothing());
        assert!(session.path.segments().iter().all(Segment::is_linear));
        assert!(
            !session
                .selection
                .contains(&SelectedItem::handle(mid, HandleSide::Out))
        );
    }

    #[test]
    fn smoothing_without_anchors_does_nothing() {
        let mut session = EditSession::default();
        assert!(!session.toggle_smoothing());
    }

    #[test]
    fn delete_keeps_endpoints() {
        let (mut session, mid) = three_anchor_session();
        let first = session.path.segments()[0].id;
        session.selection.insert(SelectedItem::anchor(first), 0);
        assert_eq!(session.selection.len(), 2);

        assert_eq!(session.delete_selection(), 1);
        assert_eq!(session.path.len(), 2);
        assert!(session.path.get(mid).is_none());
        assert_eq!(
            session.selection.iter().copied().collect::<Vec<_>>(),
            vec![SelectedItem::anchor(first)]
        );
        assert_eq!(session.eval(0.5), Some(0.5));
    }

    #[test]
    fn insert_selects_only_the_new_anchor_and_recompiles() {
        let mut session = EditSession::default();
        let first = session.path.segments()[0].id;
        session.selection.insert(SelectedItem::anchor(first), 0);

        let id = session.insert_point(Point::new(0.5, 0.1), 20).unwrap();
        assert_eq!(
            session.selection.iter().copied().collect::<Vec<_>>(),
            vec![SelectedItem::anchor(id)]
        );
        assert!((session.eval(0.5).unwrap() - 0.1).abs() < 1e-12);
    }
}
