//! Incremental regeneration and dependency repair for a history-based
//! parametric model.
//!
//! A [`Model`] holds the construction history (groups, requests,
//! constraints) plus the entities and params rebuilt from it on every pass.
//! [`Model::regenerate`] walks the history, prunes objects whose dependencies
//! disappeared, warm-starts params from the previous pass and hands each dirty
//! group to a [`GroupSolver`].

pub mod config;
pub mod edit;
pub mod generate;
pub mod geometry;
pub mod mesh;
pub mod model;
pub mod prune;
pub mod references;
pub mod regenerate;
pub mod solve;
pub mod store;
pub mod system;
pub mod types;
pub mod undo;

pub use config::{RegenConfig, Units};
pub use geometry::{Geometry, ParamSource, Plane};
pub use model::Model;
pub use references::ReferencePlane;
pub use solve::{GroupSolver, NumericSolver};
pub use store::{EntityStore, ParamStore, Store};
pub use system::{Equation, System};
pub use types::{DeletionCounts, DeletionNotice, EngineError, RegenReport, Selection};
