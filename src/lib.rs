//! # modtree - Nested Go Module Dependency Trees
//!
//! modtree checks out a Go project, downloads its modules, and walks the
//! module graph directory by directory to produce the full dependency tree
//! rather than the flat list `go list -m all` prints.
//!
//! ## Quick Start
//!
//! ```bash
//! modtree https://github.com/spf13/cobra v1.8.0 > tree.json
//! modtree https://github.com/spf13/cobra main --format text --summary
//! ```
//!
//! ## Module Organization
//!
//! - [`resolver`] - Immediate dependencies of one directory
//! - [`tree`] - Recursive, parallel tree construction and text rendering
//! - [`oracle`] - Module graph queries (`go list`, `go mod tidy`)
//! - [`checkout`] - Repository acquisition with git2
//! - [`output`] - JSON / text serialization

/// Dependency tree nodes.
pub mod artifact;

/// Repository checkout (git2).
pub mod checkout;

/// Configuration file parsing (`modtree.toml`).
pub mod config;

/// Error types.
pub mod error;

/// Tracing subscriber setup.
pub mod logging;

/// Module graph oracle and package fetcher.
pub mod oracle;

/// Forest serialization.
pub mod output;

/// Checkout, download and build in one call.
pub mod pipeline;

/// Directory dependency resolution.
pub mod resolver;

/// Tree statistics for `--summary`.
pub mod stats;

/// Tree construction and visualization.
pub mod tree;

/// Terminal UI utilities (tables).
pub mod ui;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use artifact::{Artifact, DirectoryBinding};
pub use error::{Result, TreeError};
pub use resolver::{Resolution, Resolver};
pub use tree::{BuildOptions, CyclePolicy, TreeBuilder};
