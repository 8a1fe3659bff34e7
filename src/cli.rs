// Copyright 2025 the Curvesmith Authors
// SPDX-License-Identifier: Apache-2.0

//! Command line front end: compile a path snapshot and print the result

use crate::compile::{CompileOptions, CompiledResult, compile_path_to_function};
use crate::model::CurvePath;
use crate::settings::EditorSettings;
use anyhow::{Context, Result, bail};
use std::fmt::Write;
use std::path::PathBuf;

const USAGE: &str =
    "Usage: curvesmith [PATH.json] [--config FILE.toml] [--sampled] [--precision N] [--no-typed]";

/// Rows of the printed evaluation table
const TABLE_ROWS: usize = 10;

/// Parsed command line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    pub path: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub sampled: bool,
    pub precision: Option<usize>,
    pub no_typed: bool,
}

impl CliArgs {
    /// Parse arguments (without the program name)
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut parsed = CliArgs::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let value = args.next().context("--config needs a file")?;
                    parsed.config = Some(PathBuf::from(value));
                }
                "--sampled" => parsed.sampled = true,
                "--precision" => {
                    let value = args.next().context("--precision needs a number")?;
                    let precision = value
                        .parse()
                        .with_context(|| format!("Invalid precision '{value}'"))?;
                    parsed.precision = Some(precision);
                }
                "--no-typed" => parsed.no_typed = true,
                flag if flag.starts_with("--") => bail!("Unknown option {flag}\n{USAGE}"),
                path => {
                    if parsed.path.is_some() {
                        bail!("Only one path snapshot can be given\n{USAGE}");
                    }
                    parsed.path = Some(PathBuf::from(path));
                }
            }
        }
        Ok(parsed)
    }

    /// Settings file values with the command line flags applied on top
    pub fn settings(&self) -> Result<EditorSettings> {
        let mut settings = match &self.config {
            Some(path) => EditorSettings::load(path)?,
            None => EditorSettings::default(),
        };
        let compile = &mut settings.compile;
        compile.use_sampling |= self.sampled;
        if let Some(precision) = self.precision {
            compile.precision = precision;
        }
        if self.no_typed {
            compile.emit_typed_source = false;
        }
        Ok(settings)
    }
}

/// Load the path snapshot, or the diagonal when none was given
fn load_path(args: &CliArgs, settings: &EditorSettings) -> Result<CurvePath> {
    let Some(file) = &args.path else {
        return Ok(CurvePath::new(settings.domain));
    };
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read path snapshot {}", file.display()))?;
    let path = CurvePath::from_json(&json, settings.domain)
        .with_context(|| format!("Failed to parse path snapshot {}", file.display()))?;
    tracing::info!("Loaded {} anchors from {}", path.len(), file.display());
    Ok(path)
}

/// Human readable report of a compile
pub fn report(result: &CompiledResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "// untyped");
    out.push_str(&result.untyped_source);
    if let Some(typed) = &result.typed_source {
        let _ = writeln!(out, "\n// typed");
        out.push_str(typed);
    }
    let _ = writeln!(
        out,
        "\n// {} in {:.3} ms",
        if result.sampled {
            format!("sampled, {} samples per joint", result.precision)
        } else {
            "exact".to_string()
        },
        result.compile_duration_ms()
    );
    for i in 0..=TABLE_ROWS {
        let t = i as f64 / TABLE_ROWS as f64;
        let _ = writeln!(out, "// f({t:.1}) = {:.6}", result.eval(t));
    }
    out
}

/// Compile as the command line asks and return the report
pub fn execute(args: &CliArgs) -> Result<String> {
    let settings = args.settings()?;
    let path = load_path(args, &settings)?;
    let options: CompileOptions = settings.compile;
    let result = compile_path_to_function(&path, &options).context("Failed to compile path")?;
    Ok(report(&result))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<CliArgs> {
        CliArgs::parse(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn parses_flags_and_path() {
        let parsed = args(&["curve.json", "--sampled", "--precision", "20", "--no-typed"]).unwrap();
        assert_eq!(parsed.path, Some(PathBuf::from("curve.json")));
        assert!(parsed.sampled);
        assert_eq!(parsed.precision, Some(20));
        assert!(parsed.no_typed);
        assert_eq!(parsed.config, None);
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(args(&["--precision"]).is_err());
        assert!(args(&["--precision", "many"]).is_err());
        assert!(args(&["--frobnicate"]).is_err());
        assert!(args(&["a.json", "b.json"]).is_err());
    }

    #[test]
    fn flags_override_settings() {
        let parsed = args(&["--sampled", "--precision", "7", "--no-typed"]).unwrap();
        let settings = parsed.settings().unwrap();
        assert!(settings.compile.use_sampling);
        assert_eq!(settings.compile.precision, 7);
        assert!(!settings.compile.emit_typed_source);
    }

    #[test]
    fn default_run_reports_the_diagonal() {
        let report = execute(&CliArgs::default()).unwrap();
        assert!(report.contains("function interpolate(t) {"));
        assert!(report.contains("function interpolate(t: number): number {"));
        assert!(report.contains("// f(0.5) = 0.500000"));
    }

    #[test]
    fn missing_snapshot_is_reported() {
        let parsed = args(&["/nonexistent/curve.json"]).unwrap();
        let err = execute(&parsed).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read path snapshot"));
    }
}
