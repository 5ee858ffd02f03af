// SPDX-License-Identifier: MIT

//! Speech output - console announcement or an external TTS program

use super::Speaker;
use crate::error::CapabilityError;
use async_trait::async_trait;
use tokio::process::Command;

/// Prints the announcement instead of speaking it
#[derive(Debug, Default, Clone)]
pub struct ConsoleSpeaker;

#[async_trait]
impl Speaker for ConsoleSpeaker {
    async fn speak(&self, text: &str) -> Result<(), CapabilityError> {
        println!("\n[VOICE] {}", text);
        Ok(())
    }
}

/// Runs a TTS program (e.g. `espeak`) with the text as its last argument
#[derive(Debug, Clone)]
pub struct CommandSpeaker {
    program: String,
    args: Vec<String>,
}

impl CommandSpeaker {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[async_trait]
impl Speaker for CommandSpeaker {
    async fn speak(&self, text: &str) -> Result<(), CapabilityError> {
        log::debug!("Speaking with {} {:?}", self.program, self.args);

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CapabilityError::Speech(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}
