//! Common utilities for the boxflow layout engine.
//!
//! This crate provides shared infrastructure used by the layout core and the CLI:
//! - **Warning System** - colored, deduplicated terminal output for
//!   unsupported or degenerate input

pub mod warning;
