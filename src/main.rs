// Copyright 2025 the Curvesmith Authors
// SPDX-License-Identifier: Apache-2.0

//! Curvesmith: compile a curve snapshot from the command line

fn main() -> anyhow::Result<()> {
    curvesmith::run(std::env::args().skip(1))
}
