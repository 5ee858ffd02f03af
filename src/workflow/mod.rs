// SPDX-License-Identifier: MIT

pub mod graph;
pub mod stage;
pub mod state;
