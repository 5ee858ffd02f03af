// SPDX-License-Identifier: MIT

//! Graph-based workflow execution
//!
//! This module provides the executor that walks the stage graph, the
//! builder that wires and validates it, and a DOT renderer.

mod builder;
mod dot;
pub mod executor;
pub mod types;

pub use builder::GraphBuilder;
pub use dot::to_dot;
pub use executor::{ExecutionTrace, WorkflowGraph};
pub use types::{route_on_intent, Edge, Intent, Next, Router, StageId};
