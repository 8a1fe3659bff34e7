// Copyright 2025 the Curvesmith Authors
// SPDX-License-Identifier: Apache-2.0

//! Selection set of anchors and handles.
//!
//! `Selection` wraps an `Arc<BTreeMap<..>>` so it can be cloned cheaply and
//! compared before/after an interaction. Mutations go through
//! `Arc::make_mut`. Each entry remembers when it was added (for the click
//! debounce) and, while a drag is in progress, the absolute point it had
//! when the drag started.

use crate::model::{HandleSide, SegmentId};
use kurbo::Point;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Which part of a segment is selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Part {
    Anchor,
    HandleIn,
    HandleOut,
}

impl Part {
    /// The handle side for handle parts
    pub fn side(self) -> Option<HandleSide> {
        match self {
            Part::Anchor => None,
            Part::HandleIn => Some(HandleSide::In),
            Part::HandleOut => Some(HandleSide::Out),
        }
    }

    pub fn from_side(side: HandleSide) -> Self {
        match side {
            HandleSide::In => Part::HandleIn,
            HandleSide::Out => Part::HandleOut,
        }
    }
}

/// A (segment, part) reference; the selection key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SelectedItem {
    pub segment: SegmentId,
    pub part: Part,
}

impl SelectedItem {
    pub fn anchor(segment: SegmentId) -> Self {
        Self {
            segment,
            part: Part::Anchor,
        }
    }

    pub fn handle(segment: SegmentId, side: HandleSide) -> Self {
        Self {
            segment,
            part: Part::from_side(side),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Entry {
    added_at: u64,
    frozen: Option<Point>,
}

/// The set of selected anchors and handles
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selection {
    inner: Arc<BTreeMap<SelectedItem, Entry>>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn contains(&self, item: &SelectedItem) -> bool {
        self.inner.contains_key(item)
    }

    /// Selected items in (segment id, part) order
    pub fn iter(&self) -> impl Iterator<Item = &SelectedItem> {
        self.inner.keys()
    }

    /// Ids of selected anchors
    pub fn anchors(&self) -> impl Iterator<Item = SegmentId> + '_ {
        self.iter()
            .filter(|item| item.part == Part::Anchor)
            .map(|item| item.segment)
    }

    /// Add `item` stamped with `now`
    ///
    /// Items already selected keep their original timestamp.
    pub fn insert(&mut self, item: SelectedItem, now: u64) {
        if self.contains(&item) {
            return;
        }
        Arc::make_mut(&mut self.inner).insert(
            item,
            Entry {
                added_at: now,
                frozen: None,
            },
        );
    }

    pub fn remove(&mut self, item: &SelectedItem) -> bool {
        if !self.contains(item) {
            return false;
        }
        Arc::make_mut(&mut self.inner).remove(item).is_some()
    }

    /// Flip membership; returns whether the item is selected afterwards
    pub fn toggle(&mut self, item: SelectedItem, now: u64) -> bool {
        if self.remove(&item) {
            false
        } else {
            self.insert(item, now);
            true
        }
    }

    pub fn clear(&mut self) {
        if !self.is_empty() {
            self.inner = Arc::default();
        }
    }

    /// When `item` was added, if selected
    pub fn added_at(&self, item: &SelectedItem) -> Option<u64> {
        self.inner.get(item).map(|entry| entry.added_at)
    }

    /// Whether `item` was added less than `window_ms` before `now`
    pub fn recently_added(&self, item: &SelectedItem, now: u64, window_ms: u64) -> bool {
        self.added_at(item)
            .is_some_and(|added| now.saturating_sub(added) < window_ms)
    }

    /// Remember the absolute point of every selected item
    pub fn freeze(&mut self, mut point_of: impl FnMut(&SelectedItem) -> Option<Point>) {
        for (item, entry) in Arc::make_mut(&mut self.inner).iter_mut() {
            entry.frozen = point_of(item);
        }
    }

    /// The point `item` had at the last freeze
    pub fn frozen(&self, item: &SelectedItem) -> Option<Point> {
        self.inner.get(item).and_then(|entry| entry.frozen)
    }

    /// Keep only items for which `keep` returns true
    pub fn retain(&mut self, mut keep: impl FnMut(&SelectedItem) -> bool) {
        if self.inner.keys().all(|item| keep(item)) {
            return;
        }
        Arc::make_mut(&mut self.inner).retain(|item, _| keep(item));
    }

    /// Drop every part of `segment`
    pub fn remove_segment(&mut self, segment: SegmentId) {
        self.retain(|item| item.segment != segment);
    }
}
