// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test harness for contact form abuse simulation.
//!
//! Drives the limiter/validator/relay pipeline with scripted traffic on a
//! simulated clock and tallies the outcomes.

pub mod attacks;
pub mod generators;
pub mod metrics;
