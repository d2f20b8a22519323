//! # cellcalc-core
//!
//! Dependency tracking and recalculation ordering for cellcalc.
//!
//! This crate provides:
//! - [`DependencyGraph`] - a set of `(dependee, dependent)` edges with mirrored
//!   forward and backward indexes
//! - [`DependencyGraph::recalculation_order`] - a topologically valid evaluation
//!   order for everything affected by a change, or a [`CycleError`]
//!
//! Nodes are opaque string names; nothing here knows about formulas or cells.
//!
//! ## Example
//!
//! ```rust
//! use cellcalc_core::DependencyGraph;
//!
//! let mut graph = DependencyGraph::new();
//! // C1 = A1 + B1
//! graph.replace_dependees("C1", ["A1", "B1"]);
//! assert_eq!(graph.edge_count(), 2);
//!
//! let order = graph.recalculation_order("A1").unwrap();
//! assert_eq!(order, ["A1", "C1"]);
//! ```

pub mod dependency;
pub mod recalc;

pub use dependency::DependencyGraph;
pub use recalc::CycleError;
