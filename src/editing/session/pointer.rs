// Copyright 2025 the Curvesmith Authors
// SPDX-License-Identifier: Apache-2.0

//! Pointer gestures for EditSession.
//!
//! A gesture is press, any number of drags, release. The press picks the
//! selection and freezes it; drags move it; the release either finishes
//! the drag or, when it was quick and short, counts as a click. Clicks get
//! a second chance at the selection (shift toggles) and alt-clicks toggle
//! smoothing.

use super::{EditSession, GridDensity};
use crate::editing::mouse::{MouseButton, MouseEvent};
use crate::editing::selection::SelectedItem;

impl EditSession {
    /// Start a gesture
    ///
    /// Only the left button edits.
    pub fn mouse_down(&mut self, event: MouseEvent) {
        if event.button != Some(MouseButton::Left) {
            return;
        }
        self.is_mouse_down = true;
        self.last_press = Some(event);
        let hit = self.hit_test(event.pos).map(|h| h.item);
        self.select_on_press(hit, &event);
        self.freeze_selection();
        self.hover(event.pos, event.mods);
    }

    /// Continue a gesture
    pub fn mouse_drag(&mut self, event: MouseEvent) {
        if !self.is_mouse_down {
            return;
        }
        self.transform_selection(&event);
        self.hover(event.pos, event.mods);
    }

    /// Finish a gesture
    ///
    /// Returns whether the gesture was a click.
    pub fn mouse_up(&mut self, event: MouseEvent) -> bool {
        if !self.is_mouse_down {
            return false;
        }
        self.is_mouse_down = false;

        let is_click = self.is_click(&event);
        if is_click {
            self.select_on_click(&event);
            if event.mods.exclusive_edit() {
                self.toggle_smoothing();
            }
        }

        self.grid = GridDensity::Coarse;
        self.settle();
        self.hover(event.pos, event.mods);
        is_click
    }

    /// Whether a release is close enough in time and space to its press
    pub fn is_click(&self, event: &MouseEvent) -> bool {
        let Some(press) = self.last_press else {
            return false;
        };
        let elapsed = event.timestamp_ms.saturating_sub(press.timestamp_ms);
        let moved = (event.pos - press.pos).hypot();
        elapsed < self.settings.click_debounce_ms && moved < self.settings.click_radius()
    }

    /// Selection rules for a press on `hit`
    fn select_on_press(&mut self, hit: Option<SelectedItem>, event: &MouseEvent) {
        let mods = event.mods;
        let now = event.timestamp_ms;
        match hit {
            None => {
                // modifiers may still be about to act on the selection
                if !mods.adds_to_selection() && !mods.exclusive_edit() {
                    self.selection.clear();
                }
            }
            Some(item) if mods.exclusive_edit() => {
                if !self.selection.contains(&item) {
                    self.selection.clear();
                    self.selection.insert(item, now);
                }
            }
            Some(item) if mods.adds_to_selection() => {
                self.selection.insert(item, now);
            }
            Some(item) => {
                self.selection.clear();
                self.selection.insert(item, now);
            }
        }
        tracing::debug!("[select_on_press] {} items selected", self.selection.len());
    }

    /// Selection rules for a click: shift toggles what was hit, unless the
    /// press just added it
    fn select_on_click(&mut self, event: &MouseEvent) {
        if !event.mods.adds_to_selection() {
            return;
        }
        let Some(hit) = self.hit_test(event.pos) else {
            return;
        };
        let window = self.settings.click_debounce_ms;
        if self
            .selection
            .recently_added(&hit.item, event.timestamp_ms, window)
        {
            return;
        }
        let selected = self.selection.toggle(hit.item, event.timestamp_ms);
        tracing::debug!(
            "[select_on_click] {} {:?} now {}",
            hit.item.segment,
            hit.item.part,
            if selected { "selected" } else { "deselected" }
        );
    }
}
