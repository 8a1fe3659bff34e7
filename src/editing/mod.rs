// Copyright 2025 the Curvesmith Authors
// SPDX-License-Identifier: Apache-2.0

//! Editing model and interaction

pub mod mouse;
pub mod selection;
pub mod session;

pub use mouse::{Modifiers, MouseButton, MouseEvent};
pub use selection::{Part, SelectedItem, Selection};
pub use session::{Cursor, EditSession, GridDensity, HitTestResult};
