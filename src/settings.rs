// Copyright 2025 the Curvesmith Authors
// SPDX-License-Identifier: Apache-2.0

//! Editor settings and tuning constants.
//!
//! The constants at the top are the defaults. Code reads them through the
//! `pub mod` groups below, or through [`EditorSettings`] when a value can be
//! overridden from a TOML file. Distances are fractions of the path domain
//! so the same file works for any domain size.

use crate::compile::CompileOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// EDITOR SETTINGS
// ============================================================================
/// Width and height of the editable square
const DOMAIN_SIZE: f64 = 1.0;

/// Hit-test radius around anchors and handles (fraction of the domain)
const HIT_TOLERANCE: f64 = 0.02;

/// Length of the handle an endpoint gets when smoothed (fraction of domain)
const SMOOTHING_HANDLE_RATIO: f64 = 0.1;

// ============================================================================
// GRID SETTINGS
// ============================================================================
/// Cells per side used when snapping with ctrl held
const SNAP_GRID_CELLS: u32 = 16;

/// Cells per side of the grid shown while not snapping
const COARSE_GRID_CELLS: u32 = 4;

// ============================================================================
// POINTER SETTINGS
// ============================================================================
/// A release within this many ms of the press can be a click, and a
/// shift-click within this many ms of a press-add does not undo it
const CLICK_DEBOUNCE_MS: u64 = 300;

/// A release that moved less than this is a click (fraction of domain)
const CLICK_SLOP: f64 = 0.006;

// ============================================================================
// COMPILE SETTINGS
// ============================================================================
/// Samples per joint for the lookup-table evaluator
const SAMPLE_PRECISION: usize = 100;

/// Number of steps of the validation sweep over [0, 1]
const VALIDATION_STEPS: usize = 100;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Editing geometry defaults
pub mod editor {
    pub const DOMAIN_SIZE: f64 = super::DOMAIN_SIZE;
    pub const HIT_TOLERANCE: f64 = super::HIT_TOLERANCE;
    pub const SMOOTHING_HANDLE_RATIO: f64 = super::SMOOTHING_HANDLE_RATIO;
}

/// Grid shown and snapped to while dragging
pub mod grid {
    /// Snap grid (also the grid shown while snapping)
    pub const SNAP_CELLS: u32 = super::SNAP_GRID_CELLS;

    /// Grid shown otherwise
    pub const COARSE_CELLS: u32 = super::COARSE_GRID_CELLS;
}

/// Click versus drag disambiguation
pub mod pointer {
    pub const CLICK_DEBOUNCE_MS: u64 = super::CLICK_DEBOUNCE_MS;
    pub const CLICK_SLOP: f64 = super::CLICK_SLOP;
}

/// Compiler defaults
pub mod compile {
    pub const DEFAULT_PRECISION: usize = super::SAMPLE_PRECISION;
    pub const VALIDATION_STEPS: usize = super::VALIDATION_STEPS;
}

/// Runtime-overridable settings
///
/// Every field falls back to its default when missing from the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub domain: f64,
    pub hit_tolerance: f64,
    pub smoothing_handle_ratio: f64,
    pub snap_cells: u32,
    pub coarse_cells: u32,
    pub click_debounce_ms: u64,
    pub click_slop: f64,
    pub compile: CompileOptions,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            domain: editor::DOMAIN_SIZE,
            hit_tolerance: editor::HIT_TOLERANCE,
            smoothing_handle_ratio: editor::SMOOTHING_HANDLE_RATIO,
            snap_cells: grid::SNAP_CELLS,
            coarse_cells: grid::COARSE_CELLS,
            click_debounce_ms: pointer::CLICK_DEBOUNCE_MS,
            click_slop: pointer::CLICK_SLOP,
            compile: CompileOptions::default(),
        }
    }
}

impl EditorSettings {
    /// Parse settings from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Self = toml::from_str(text).context("Failed to parse editor settings")?;
        if !(settings.domain.is_finite() && settings.domain > 0.0) {
            anyhow::bail!("domain must be a positive number, got {}", settings.domain);
        }
        Ok(settings)
    }

    /// Load settings from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let settings = Self::from_toml_str(&text)
            .with_context(|| format!("Invalid settings in {}", path.display()))?;
        tracing::debug!("[EditorSettings::load] loaded {}", path.display());
        Ok(settings)
    }

    /// Hit-test radius in curve units
    pub fn hit_radius(&self) -> f64 {
        self.hit_tolerance * self.domain
    }

    /// Click slop in curve units
    pub fn click_radius(&self) -> f64 {
        self.click_slop * self.domain
    }
}
