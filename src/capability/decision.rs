// SPDX-License-Identifier: MIT

//! Human decision sources - stdin for real runs, a fixed script for tests

use super::{DecisionProvider, ReviewSnapshot};
use crate::error::CapabilityError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::io::Write;
use std::sync::Mutex;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::Mutex as AsyncMutex;

/// Reads decisions one line per prompt, from stdin unless given another reader.
///
/// Lines are decoded lossily, so bytes that are not UTF-8 come through as an
/// unrecognized answer instead of an error.
pub struct ConsoleDecisions<R = BufReader<Stdin>> {
    reader: AsyncMutex<R>,
}

impl ConsoleDecisions {
    pub fn new() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }
}

impl Default for ConsoleDecisions {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> ConsoleDecisions<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader: AsyncMutex::new(reader),
        }
    }
}

#[async_trait]
impl<R> DecisionProvider for ConsoleDecisions<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn present(&self, review: &ReviewSnapshot) -> Result<(), CapabilityError> {
        println!("\n[MODEL OUTPUT] Model Output:\n{}", review.generated_text);
        println!("\n[REVIEWED] Current Output:\n{}", review.reviewed_text);
        if let Some(score) = review.reward_score {
            println!("\n[REWARD] Similarity to source: {}", score);
        }
        Ok(())
    }

    async fn read_line(&self, prompt: &str) -> Result<String, CapabilityError> {
        print!("{}", prompt);
        std::io::stdout().flush()?;

        let mut buf = Vec::new();
        let mut reader = self.reader.lock().await;
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Err(CapabilityError::InputClosed);
        }

        let line = String::from_utf8_lossy(&buf);
        Ok(line.trim_end_matches(['\n', '\r']).to_string())
    }
}

/// Replays a fixed sequence of answers and records what was asked
#[derive(Default)]
pub struct ScriptedDecisions {
    answers: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
    presented: Mutex<Vec<ReviewSnapshot>>,
}

impl ScriptedDecisions {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
            presented: Mutex::new(Vec::new()),
        }
    }

    /// How many times the gate prompted
    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Every snapshot shown before prompting
    pub fn presented(&self) -> Vec<ReviewSnapshot> {
        self.presented
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl DecisionProvider for ScriptedDecisions {
    async fn present(&self, review: &ReviewSnapshot) -> Result<(), CapabilityError> {
        if let Ok(mut presented) = self.presented.lock() {
            presented.push(review.clone());
        }
        Ok(())
    }

    async fn read_line(&self, prompt: &str) -> Result<String, CapabilityError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        self.answers
            .lock()
            .ok()
            .and_then(|mut answers| answers.pop_front())
            .ok_or(CapabilityError::InputClosed)
    }
}
