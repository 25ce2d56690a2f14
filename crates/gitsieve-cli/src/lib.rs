// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! gitsieve-cli library
//!
//! Exposes the command-line configuration and query runner so integration
//! tests can drive queries without spawning the binary.

pub mod config;
pub mod query;
