// SPDX-License-Identifier: MIT

//! Run configuration
//!
//! Resolved as defaults, then an optional YAML file, then environment
//! variables. CLI flags are applied last by `main`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::capability::huggingface::DEFAULT_API_BASE;
use crate::capability::GenerationParams;
use crate::error::PipelineError;
use crate::versioning::DEFAULT_EXPORT_FILE;

pub const DEFAULT_SOURCE_URL: &str =
    "https://en.wikisource.org/wiki/The_Gates_of_Morning/Book_1/Chapter_1";
const DEFAULT_SUMMARY_MODEL: &str = "sshleifer/distilbart-cnn-12-6";
const DEFAULT_SIMILARITY_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Which similarity backend the Score stage uses
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScorerKind {
    /// Local term-frequency cosine
    #[default]
    Lexical,
    /// Sentence-similarity model on the inference API
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub output_dir: PathBuf,
    pub api_base_url: String,
    /// Never written back out
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    pub summary_model: String,
    pub review_model: String,
    pub similarity_model: String,
    pub scorer: ScorerKind,
    /// External TTS program; console output when unset
    pub speech_command: Option<String>,
    pub speech_args: Vec<String>,
    pub summary_input_chars: usize,
    pub temperature: Option<f32>,
    pub do_sample: Option<bool>,
    pub max_review_passes: Option<u32>,
    pub export_file_name: String,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("outputs"),
            api_base_url: DEFAULT_API_BASE.to_string(),
            api_token: None,
            summary_model: DEFAULT_SUMMARY_MODEL.to_string(),
            review_model: DEFAULT_SUMMARY_MODEL.to_string(),
            similarity_model: DEFAULT_SIMILARITY_MODEL.to_string(),
            scorer: ScorerKind::default(),
            speech_command: None,
            speech_args: Vec::new(),
            summary_input_chars: 2000,
            temperature: Some(1.5),
            do_sample: Some(true),
            max_review_passes: None,
            export_file_name: DEFAULT_EXPORT_FILE.to_string(),
            request_timeout_secs: 60,
        }
    }
}

impl Config {
    /// Defaults, overlaid by `path` if given, then by the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, PipelineError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, PipelineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            PipelineError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse_yaml(&content)
    }

    pub fn parse_yaml(content: &str) -> Result<Self, PipelineError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Overlay values from an environment lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("REVISION_LOOP_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(base) = lookup("HF_API_BASE_URL") {
            self.api_base_url = base;
        }
        if let Some(token) = lookup("HUGGINGFACEHUB_API_TOKEN").filter(|t| !t.is_empty()) {
            self.api_token = Some(token);
        }
        if let Some(model) = lookup("HF_SUMMARY_MODEL") {
            self.summary_model = model;
        }
        if let Some(model) = lookup("HF_REVIEW_MODEL") {
            self.review_model = model;
        }
        if let Some(model) = lookup("HF_SIMILARITY_MODEL") {
            self.similarity_model = model;
        }
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.summary_input_chars == 0 {
            return Err(PipelineError::config("summary_input_chars must be positive"));
        }
        if self.max_review_passes == Some(0) {
            return Err(PipelineError::config(
                "max_review_passes must be positive (omit it for no cap)",
            ));
        }
        if self.export_file_name.trim().is_empty() {
            return Err(PipelineError::config("export_file_name must not be empty"));
        }
        Ok(())
    }

    /// Sampling parameters for the summary call; `None` if all are unset
    pub fn generation_params(&self) -> Option<GenerationParams> {
        if self.temperature.is_none() && self.do_sample.is_none() {
            return None;
        }
        Some(GenerationParams {
            do_sample: self.do_sample,
            temperature: self.temperature,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.output_dir, PathBuf::from("outputs"));
        assert_eq!(config.summary_input_chars, 2000);
        assert_eq!(config.scorer, ScorerKind::Lexical);
        assert!(config.max_review_passes.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
output_dir: /tmp/runs
scorer: remote
max_review_passes: 5
speech_command: espeak
speech_args: ["-s", "150"]
"#;
        let config = Config::parse_yaml(yaml).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/tmp/runs"));
        assert_eq!(config.scorer, ScorerKind::Remote);
        assert_eq!(config.max_review_passes, Some(5));
        assert_eq!(config.speech_command.as_deref(), Some("espeak"));
        assert_eq!(config.speech_args, vec!["-s", "150"]);
        // Unmentioned keys keep defaults
        assert_eq!(config.summary_model, DEFAULT_SUMMARY_MODEL);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("REVISION_LOOP_OUTPUT_DIR", "out"),
            ("HUGGINGFACEHUB_API_TOKEN", "hf_secret"),
            ("HF_REVIEW_MODEL", "org/reviewer"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.api_token.as_deref(), Some("hf_secret"));
        assert_eq!(config.review_model, "org/reviewer");
        assert_eq!(config.summary_model, DEFAULT_SUMMARY_MODEL);
    }

    #[test]
    fn test_empty_token_ignored() {
        let mut config = Config::default();
        config.apply_env(|k| (k == "HUGGINGFACEHUB_API_TOKEN").then(String::new));
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_token_not_serialized() {
        let config = Config {
            api_token: Some("hf_secret".to_string()),
            ..Config::default()
        };
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("hf_secret"));
    }

    #[test]
    fn test_validate_rejects_zero_cap() {
        let config = Config {
            max_review_passes: Some(0),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_generation_params() {
        let params = Config::default().generation_params().unwrap();
        assert_eq!(params.temperature, Some(1.5));
        assert_eq!(params.do_sample, Some(true));
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            serde_json::json!({"do_sample": true, "temperature": 1.5})
        );

        let config = Config {
            temperature: None,
            do_sample: None,
            ..Config::default()
        };
        assert!(config.generation_params().is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "summary_input_chars: 500\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.summary_input_chars, 500);

        assert!(matches!(
            Config::from_file(&dir.path().join("missing.yaml")),
            Err(PipelineError::Config(_))
        ));
    }
}
