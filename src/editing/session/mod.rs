// Copyright 2025 the Curvesmith Authors
// SPDX-License-Identifier: Apache-2.0

//! Edit session: the path being edited, its selection and compiled form.
//!
//! All interaction goes through `&mut EditSession`. Pointer handling lives
//! in `pointer`, geometry edits in `path_editing`, and hit testing in
//! `hit_testing`. Intermediate drag moves only touch the path; the compiled
//! function is rebuilt on [`EditSession::settle`], which every finished
//! edit (release, insertion, deletion, smoothing) calls.

mod hit_testing;
mod path_editing;
mod pointer;

pub use hit_testing::HitTestResult;
pub use path_editing::{clamp_handle, mirror_handle, snap_to_grid};

use super::mouse::MouseEvent;
use super::selection::Selection;
use crate::compile::{CompileOptions, CompiledResult, FunctionCompiler};
use crate::error::CurveError;
use crate::model::{CurvePath, Fingerprint};
use crate::settings::EditorSettings;

/// Which grid the renderer should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridDensity {
    #[default]
    Coarse,
    /// Shown while snapping
    Fine,
}

impl GridDensity {
    /// Cells per side for this density
    pub fn cells(self, settings: &EditorSettings) -> u32 {
        match self {
            GridDensity::Coarse => settings.coarse_cells,
            GridDensity::Fine => settings.snap_cells,
        }
    }
}

/// Cursor hint for the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Crosshair,
    Grabbing,
    Copy,
}

/// Editing state for one curve
#[derive(Debug, Clone)]
pub struct EditSession {
    /// The curve being edited
    pub path: CurvePath,

    /// Selected anchors and handles
    pub selection: Selection,

    pub settings: EditorSettings,

    /// Grid the renderer should show
    pub grid: GridDensity,

    /// Cursor the host should show
    pub cursor: Cursor,

    /// The press that started the current gesture
    last_press: Option<MouseEvent>,
    is_mouse_down: bool,

    compiler: FunctionCompiler,
    compiled: Option<CompiledResult>,
    /// Fingerprint of the path the last compile attempt saw
    compiled_from: Option<Fingerprint>,
    fn_has_error: bool,
}

impl EditSession {
    /// A session editing the diagonal over the configured domain
    pub fn new(settings: EditorSettings) -> Self {
        Self::with_path(CurvePath::new(settings.domain), settings)
    }

    /// A session editing `path`
    pub fn with_path(path: CurvePath, settings: EditorSettings) -> Self {
        let mut session = Self {
            path,
            selection: Selection::new(),
            settings,
            grid: GridDensity::default(),
            cursor: Cursor::default(),
            last_press: None,
            is_mouse_down: false,
            compiler: FunctionCompiler::new(),
            compiled: None,
            compiled_from: None,
            fn_has_error: false,
        };
        session.settle();
        session
    }

    /// The last successfully compiled function
    pub fn compiled(&self) -> Option<&CompiledResult> {
        self.compiled.as_ref()
    }

    /// Whether the latest compile failed (the compiled result is then stale)
    pub fn has_error(&self) -> bool {
        self.fn_has_error
    }

    /// Evaluate the compiled function
    pub fn eval(&self, t: f64) -> Option<f64> {
        self.compiled.as_ref().map(|c| c.eval(t))
    }

    pub fn is_mouse_down(&self) -> bool {
        self.is_mouse_down
    }

    /// Change compile options and recompile
    pub fn set_compile_options(&mut self, options: CompileOptions) {
        if self.settings.compile == options {
            return;
        }
        self.settings.compile = options;
        self.compiled_from = None;
        self.settle();
    }

    /// Recompile if the path changed since the last attempt
    ///
    /// Returns whether a compile was attempted. A failed compile keeps the
    /// previous result, marks it stale and raises the error flag.
    pub fn settle(&mut self) -> bool {
        let fingerprint = self.path.fingerprint();
        if self.compiled_from.as_ref() == Some(&fingerprint) {
            return false;
        }

        match self
            .compiler
            .compile_with_options(&self.path, &self.settings.compile)
        {
            Ok(result) => {
                self.compiled = Some(result);
                self.fn_has_error = false;
            }
            Err(err) => {
                match &err {
                    CurveError::InvalidControlPoints { .. } => {
                        tracing::error!("[EditSession::settle] {}", err);
                    }
                    _ => tracing::warn!("[EditSession::settle] {}", err),
                }
                if let Some(previous) = self.compiled.as_mut() {
                    previous.has_error = true;
                }
                self.fn_has_error = true;
            }
        }
        self.compiled_from = Some(fingerprint);
        true
    }
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new(EditorSettings::default())
    }
}
