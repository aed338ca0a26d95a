//! CCT Studio
//!
//! Concurrent calling-context tree aggregation for profiler samples.
//!
//! Producer threads fold call paths into one shared [`aggregator::CallTree`]
//! while readers snapshot, render or diff it.
//!
//! ## Getting Started
//!
//! ```bash
//! cct fold --input samples.json --summary
//! cct --help
//! ```

pub mod aggregator;
pub mod commands;
pub mod diff;
pub mod output;
pub mod parser;
pub mod tree;
pub mod utils;
