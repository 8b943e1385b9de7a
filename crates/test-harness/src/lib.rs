//! Test harness for the regeneration engine.
//!
//! Provides programmatic tools for scripting multi-step editing sessions,
//! checking model invariants after every step, and generating diagnostic
//! output.
//!
//! # Key Components
//!
//! - [`ModelBuilder`]: named-object API for building and editing models
//! - [`oracle`]: invariant checks returning pass/fail verdicts
//! - [`report`]: structured text model descriptions
//! - [`helpers`]: the recording solver and logging setup
//! - [`assertions`]: assertion helpers with diagnostics

pub mod assertions;
pub mod helpers;
pub mod oracle;
pub mod report;
pub mod workflow;

pub use helpers::{init_test_logging, HarnessError, RecordingSolver, SolveCall};
pub use oracle::OracleVerdict;
pub use report::ModelReport;
pub use workflow::ModelBuilder;
