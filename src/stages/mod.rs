// SPDX-License-Identifier: MIT

//! Stage implementations for the revision workflow
//!
//! Every stage takes its collaborators at construction and returns only the
//! fields it changed. Generate and Review record remote-call failures as
//! sentinel text instead of failing the run.

mod fetch;
mod finalize;
mod generate;
mod human;
mod persist;
mod review;
mod score;

pub use fetch::{parse_source_url, FetchStage};
pub use finalize::FinalizeStage;
pub use generate::{GenerateStage, SUMMARY_PROMPT_PREFIX};
pub use human::{HumanGateStage, GATE_PROMPT};
pub use persist::PersistStage;
pub use review::{ReviewStage, REVIEW_PROMPT};
pub use score::ScoreStage;

/// Generation returned a well-formed body without summary text
pub const NO_SUMMARY: &str = "[NO_SUMMARY]";
/// Generation call failed outright
pub const GENERATION_ERROR: &str = "[ERROR]";
/// Prefix of every review failure sentinel
pub const REVIEW_FAILED: &str = "[REVIEW_FAILED]";

/// True if `text` carries one of the generation sentinels
pub fn is_generation_sentinel(text: &str) -> bool {
    text.contains(NO_SUMMARY) || text.contains(GENERATION_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_sentinels() {
        assert!(is_generation_sentinel(NO_SUMMARY));
        assert!(is_generation_sentinel(GENERATION_ERROR));
        assert!(is_generation_sentinel("prefix [ERROR] suffix"));
        assert!(!is_generation_sentinel("A normal summary."));
        assert!(!is_generation_sentinel(REVIEW_FAILED));
    }
}
