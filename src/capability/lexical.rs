// SPDX-License-Identifier: MIT

//! Offline similarity: cosine over term-frequency vectors

use super::SimilarityScorer;
use crate::error::CapabilityError;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is",
        "it", "its", "of", "on", "or", "she", "that", "the", "to", "was", "were", "will", "with",
    ]
    .into_iter()
    .collect()
});

/// Bag-of-words cosine similarity; needs no network or model download
#[derive(Debug, Default, Clone)]
pub struct LexicalScorer;

impl LexicalScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score(text_a: &str, text_b: &str) -> f64 {
        let a = term_frequencies(text_a);
        let b = term_frequencies(text_b);
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }

        // fold from +0.0; an empty f64 sum is -0.0
        let dot = a
            .iter()
            .filter_map(|(term, count)| b.get(term).map(|other| count * other))
            .fold(0.0, |acc, x| acc + x);
        let norm_a = a.values().map(|c| c * c).sum::<f64>().sqrt();
        let norm_b = b.values().map(|c| c * c).sum::<f64>().sqrt();

        (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
    }
}

fn term_frequencies(text: &str) -> HashMap<String, f64> {
    let mut counts = HashMap::new();
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .filter(|w| !STOP_WORDS.contains(w.as_str()))
    {
        *counts.entry(word).or_insert(0.0) += 1.0;
    }
    counts
}

#[async_trait]
impl SimilarityScorer for LexicalScorer {
    async fn similarity(&self, text_a: &str, text_b: &str) -> Result<f64, CapabilityError> {
        Ok(Self::score(text_a, text_b))
    }
}
