// SPDX-License-Identifier: MIT

//! Graph type definitions
//!
//! Stage ids, successors, the routing labels of the human branch, and edges.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::workflow::state::WorkflowState;

/// A node in the workflow graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageId {
    Fetch,
    Generate,
    Review,
    Score,
    Persist,
    HumanGate,
    Finalize,
}

impl StageId {
    pub const ALL: [StageId; 7] = [
        StageId::Fetch,
        StageId::Generate,
        StageId::Review,
        StageId::Score,
        StageId::Persist,
        StageId::HumanGate,
        StageId::Finalize,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageId::Fetch => "Fetch",
            StageId::Generate => "Generate",
            StageId::Review => "Review",
            StageId::Score => "Score",
            StageId::Persist => "Persist",
            StageId::HumanGate => "HumanGate",
            StageId::Finalize => "Finalize",
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Successor of a node: another stage or the terminal marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Next {
    Stage(StageId),
    End,
}

impl fmt::Display for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Next::Stage(id) => id.fmt(f),
            Next::End => f.write_str("END"),
        }
    }
}

impl From<StageId> for Next {
    fn from(id: StageId) -> Self {
        Next::Stage(id)
    }
}

/// The two decisions a human can make at the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Stop,
    Improve,
}

impl Intent {
    pub const ALL: [Intent; 2] = [Intent::Stop, Intent::Improve];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Stop => "stop",
            Intent::Improve => "improve",
        }
    }

    /// Parse console input: trimmed, case-insensitive, exact token match
    pub fn parse(input: &str) -> Option<Intent> {
        match input.trim().to_lowercase().as_str() {
            "stop" => Some(Intent::Stop),
            "improve" => Some(Intent::Improve),
            _ => None,
        }
    }

    /// Resolve a stored intent to a routing label.
    ///
    /// Only the exact `"stop"` token ends the loop. Anything else, including
    /// a missing intent, routes to `Improve`.
    pub fn route_from(intent: Option<&str>) -> Intent {
        match intent {
            Some("stop") => Intent::Stop,
            _ => Intent::Improve,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routing function evaluated against the accumulated state
pub type Router = fn(&WorkflowState) -> Intent;

/// Default router for the human branch
pub fn route_on_intent(state: &WorkflowState) -> Intent {
    Intent::route_from(state.intent.as_deref())
}

/// Outgoing edge of a node
#[derive(Debug, Clone)]
pub enum Edge {
    /// Always go to the same successor
    Fixed(Next),
    /// Pick the successor by evaluating `router` and looking up its label
    Branch {
        router: Router,
        targets: HashMap<Intent, Next>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::state::StateUpdate;

    #[test]
    fn test_intent_parse_normalizes() {
        assert_eq!(Intent::parse("stop"), Some(Intent::Stop));
        assert_eq!(Intent::parse("  STOP \n"), Some(Intent::Stop));
        assert_eq!(Intent::parse("Improve"), Some(Intent::Improve));
        assert_eq!(Intent::parse("maybe"), None);
        assert_eq!(Intent::parse(""), None);
        assert_eq!(Intent::parse("stop please"), None);
    }

    #[test]
    fn test_route_from_defaults_to_improve() {
        assert_eq!(Intent::route_from(Some("stop")), Intent::Stop);
        assert_eq!(Intent::route_from(Some("improve")), Intent::Improve);
        assert_eq!(Intent::route_from(None), Intent::Improve);
        assert_eq!(Intent::route_from(Some("garbage")), Intent::Improve);
        assert_eq!(Intent::route_from(Some("")), Intent::Improve);
    }

    #[test]
    fn test_route_on_intent_reads_state() {
        let mut state = WorkflowState::new("https://example.com");
        assert_eq!(route_on_intent(&state), Intent::Improve);

        state.apply(StateUpdate::new().intent("stop"));
        assert_eq!(route_on_intent(&state), Intent::Stop);
    }

    #[test]
    fn test_display() {
        assert_eq!(StageId::HumanGate.to_string(), "HumanGate");
        assert_eq!(Next::End.to_string(), "END");
        assert_eq!(Next::from(StageId::Review).to_string(), "Review");
        assert_eq!(Intent::Improve.to_string(), "improve");
    }
}
