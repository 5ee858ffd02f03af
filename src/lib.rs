// SPDX-License-Identifier: MIT

//! Iterative summarize, review, score and version pipeline with a human in the loop

pub mod capability;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod stages;
pub mod versioning;
pub mod workflow;
