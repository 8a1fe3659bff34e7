// Copyright 2025 the Curvesmith Authors
// SPDX-License-Identifier: Apache-2.0

//! Pointer events as the editor sees them.
//!
//! Positions are in curve space (the same units as the path domain).
//! Timestamps are milliseconds from any monotonic clock the host likes;
//! only differences between them matter.

/// Keyboard modifiers held during a pointer event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Self::NONE
        }
    }

    /// Grow the selection instead of replacing it
    pub fn adds_to_selection(&self) -> bool {
        self.shift
    }

    /// Keep an already selected item's group, otherwise select only the hit.
    /// Also mirrors handles while dragging and toggles smoothing on click.
    pub fn exclusive_edit(&self) -> bool {
        self.alt
    }

    /// Snap dragged points to the grid
    pub fn snaps_to_grid(&self) -> bool {
        self.ctrl
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// A single pointer event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    pub pos: kurbo::Point,
    pub button: Option<MouseButton>,
    pub mods: Modifiers,
    pub timestamp_ms: u64,
}

impl MouseEvent {
    pub fn new(pos: kurbo::Point, button: Option<MouseButton>) -> Self {
        Self::with_modifiers(pos, button, Modifiers::NONE)
    }

    pub fn with_modifiers(pos: kurbo::Point, button: Option<MouseButton>, mods: Modifiers) -> Self {
        Self {
            pos,
            button,
            mods,
            timestamp_ms: 0,
        }
    }

    /// Stamp the event with the host's clock
    pub fn at(mut self, timestamp_ms: u64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    #[test]
    fn modifier_roles() {
        assert!(Modifiers::shift().adds_to_selection());
        assert!(Modifiers::alt().exclusive_edit());
        assert!(Modifiers::ctrl().snaps_to_grid());
        assert!(!Modifiers::default().adds_to_selection());
        assert_eq!(Modifiers::default(), Modifiers::NONE);
    }

    #[test]
    fn events_carry_timestamps() {
        let event = MouseEvent::new(Point::new(0.5, 0.5), Some(MouseButton::Left)).at(1200);
        assert_eq!(event.timestamp_ms, 1200);
        assert_eq!(event.mods, Modifiers::NONE);
    }
}
