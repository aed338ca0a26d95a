//! Configuration and constants for the library and CLI.

/// Version of the sample input format
pub const SAMPLE_SCHEMA_VERSION: &str = "1.0.0";

/// Version of the JSON fold and diff reports
pub const REPORT_VERSION: &str = "1.0.0";

/// Hot paths included in reports by default
pub const DEFAULT_TOP_PATHS: usize = 20;

/// Producer threads used to fold a sample file by default
pub const DEFAULT_FOLD_THREADS: usize = 4;

/// Deepest level printed by the text tree renderer by default
pub const DEFAULT_RENDER_DEPTH: usize = 12;

/// Separator between frame labels in hot path stacks
pub const PATH_SEPARATOR: char = ';';
