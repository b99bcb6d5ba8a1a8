// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer: bridges the command line to the enhancement crates.
//
// Each service wraps the backend APIs in a way that is convenient for the
// commands to call (async-friendly, returns data the CLI can print directly).

pub mod batch;
pub mod report;
