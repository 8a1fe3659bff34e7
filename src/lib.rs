// Copyright 2025 the Curvesmith Authors
// SPDX-License-Identifier: Apache-2.0

//! Curvesmith: edit a normalized x-monotonic Bezier curve and compile it
//! into a function of one variable.
//!
//! The editable [`CurvePath`] is a chain of anchors with handles. An
//! [`EditSession`] applies pointer gestures to it and keeps a compiled
//! function up to date; [`compile_path_to_function`] does the same in one
//! shot. A compiled curve can be evaluated directly, rendered as source text,
//! or reduced to a lookup table.

pub mod cli;
pub mod compile;
pub mod curve;
pub mod editing;
pub mod error;
pub mod model;
pub mod settings;

pub use compile::{
    CompileOptions, CompiledFunction, CompiledResult, CurveFunction, FunctionCompiler,
    compile_path_to_function,
};
pub use editing::EditSession;
pub use error::CurveError;
pub use model::{CurvePath, Segment, SegmentId};
pub use settings::EditorSettings;

/// Entry point for the `curvesmith` binary
pub fn run(args: impl IntoIterator<Item = String>) -> anyhow::Result<()> {
    // Initialize tracing subscriber (can be controlled via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("curvesmith=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::CliArgs::parse(args)?;
    let report = cli::execute(&args)?;
    print!("{report}");
    Ok(())
}
