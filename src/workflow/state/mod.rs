// SPDX-License-Identifier: MIT

//! State management for the revision workflow
//!
//! This module provides:
//! - `WorkflowState` - the record threaded through every stage
//! - `StateUpdate` - the partial update a stage returns, merged by overwrite

mod store;
mod update;

pub use store::WorkflowState;
pub use update::StateUpdate;
