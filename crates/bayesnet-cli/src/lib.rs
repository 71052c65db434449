//! bayesnet CLI Library
//!
//! This library exposes the pieces of the `bayesnet` command-line tool so
//! batch runs can be driven from Rust code without spawning a process.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use bayesnet_cli::batch::{BatchInput, BatchProcessor};
//! use std::path::Path;
//!
//! let input = BatchInput::read(Path::new("input.txt")).unwrap();
//! let network = bayesnet_infer::load_network(&input.network_path).unwrap();
//! let result = BatchProcessor::new(&network)
//!     .with_jobs(4)
//!     .process(&input.queries)
//!     .unwrap();
//! print!("{}", result.render(5));
//! ```
//!
//! # Module Overview
//!
//! - [`batch`]: Batch file parsing and query evaluation
//! - [`cli`]: Argument definitions
//! - [`config`]: `.bayesnetrc` configuration
//! - [`logging`]: Tracing subscriber setup
//! - [`output`]: Result rendering and colors

pub mod batch;
pub mod cli;
pub mod completion;
pub mod config;
pub mod logging;
pub mod output;

pub use batch::{BatchInput, BatchProcessor, BatchResult, QueryLine, QueryOutcome};
pub use config::Config;
