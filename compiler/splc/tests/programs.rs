//! End-to-end tests: SPL programs run through the same entry points the
//! `spl` binary uses, with output captured by a buffer print handler.
//!
//! # Organization
//!
//! - `common` - shared runners
//! - `scripts` - complete programs under `programs/scripts/`
//! - `cli` - exit codes, options, argv and the worker entry point

#[path = "programs/common.rs"]
mod common;

#[path = "programs/scripts.rs"]
mod scripts;

#[path = "programs/cli.rs"]
mod cli;
