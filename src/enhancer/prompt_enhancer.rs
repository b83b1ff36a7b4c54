//! Prompt Enhancer - Core enhancement logic
//!
//! Turns a plain prompt into an [`EnhancementRecord`]: keyword-based category
//! detection, problem extraction, solution templating and output-format
//! suggestion. The enhancer only reads its [`Config`]; it performs no I/O.

use std::sync::Arc;
use std::time::Instant;

use chrono::{Local, SecondsFormat};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::ValidationError;
use crate::model::{
    Category, EnhancedPrompt, EnhancementRecord, Metadata, OutputFormat, ENHANCEMENT_VERSION,
};

use super::keywords::{pick_highest, KeywordTables};
use super::problem::{extract_problem, normalize_whitespace};
use super::templates::render_solution_template;

/// Result of category detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextMatch {
    pub category: Category,
    /// Winner hits / all hits, 0.0 when nothing matched
    pub confidence: f64,
}

/// Analysis without the per-call metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub enhanced: EnhancedPrompt,
    pub confidence: f64,
}

/// Prompt Enhancer
#[derive(Debug, Clone)]
pub struct PromptEnhancer {
    config: Arc<Config>,
    keywords: KeywordTables,
}

impl PromptEnhancer {
    /// Create an enhancer, compiling the keyword tables of `config`
    pub fn new(config: Arc<Config>) -> Self {
        let keywords = KeywordTables::from_config(&config);
        Self { config, keywords }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Check emptiness and length bounds; returns the trimmed prompt
    pub fn validate<'a>(&self, prompt: &'a str) -> Result<&'a str, ValidationError> {
        let trimmed = prompt.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty);
        }

        let length = trimmed.chars().count();
        if length < self.config.min_prompt_length {
            return Err(ValidationError::TooShort {
                length,
                min: self.config.min_prompt_length,
            });
        }
        if length > self.config.max_prompt_length {
            return Err(ValidationError::TooLong {
                length,
                max: self.config.max_prompt_length,
            });
        }

        Ok(trimmed)
    }

    /// Enhance a prompt into the full record
    ///
    /// # Arguments
    /// * `prompt` - The raw prompt as captured from the user
    ///
    /// # Returns
    /// The record with `original_prompt` holding `prompt` unchanged
    pub fn enhance(&self, prompt: &str) -> Result<EnhancementRecord, ValidationError> {
        let started = Instant::now();
        let trimmed = self.validate(prompt)?;

        let analysis = self.analyze(trimmed);
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        info!(
            "Enhanced prompt: context={}, format={}, confidence={:.2}",
            analysis.enhanced.context, analysis.enhanced.output_format, analysis.confidence
        );

        Ok(EnhancementRecord {
            original_prompt: prompt.to_string(),
            metadata: Metadata {
                timestamp: Local::now().to_rfc3339_opts(SecondsFormat::Millis, false),
                enhancement_version: ENHANCEMENT_VERSION.to_string(),
                processing_time: format!("{:.3}", elapsed_ms),
                detected_context: analysis.enhanced.context,
                confidence_score: analysis.confidence,
            },
            enhanced_prompt: analysis.enhanced,
        })
    }

    /// Enhance the `prompt` field of a JSON request, rejecting non-string values
    pub fn enhance_value(&self, prompt: &Value) -> Result<EnhancementRecord, ValidationError> {
        match prompt {
            Value::String(s) => self.enhance(s),
            other => Err(ValidationError::NotAString {
                found: json_type_name(other),
            }),
        }
    }

    /// Deterministic part of enhancement. Does not validate.
    pub fn analyze(&self, prompt: &str) -> Analysis {
        let normalized = normalize_whitespace(prompt);
        let lowered = normalized.to_lowercase();

        let context =
            context_from_scores(&self.keywords.context_scores(&lowered), self.config.default_context);
        let problem = extract_problem(&normalized);
        let expected_solution = render_solution_template(
            self.config.solution_template(context.category),
            &problem,
            context.category,
        );
        let output_format = format_from_scores(
            &self.keywords.format_scores(&lowered),
            self.config.default_output_format,
        );

        debug!(
            "Analysis: context={} problem={:?} format={}",
            context.category, problem, output_format
        );

        Analysis {
            enhanced: EnhancedPrompt {
                context: context.category,
                problem,
                expected_solution,
                output_format,
            },
            confidence: context.confidence,
        }
    }
}

/// Detect the category of a lowercased prompt
///
/// Compiles the keyword tables on every call; [`PromptEnhancer`] keeps them.
pub fn detect_context(lowered: &str, config: &Config) -> ContextMatch {
    let scores = KeywordTables::from_config(config).context_scores(lowered);
    context_from_scores(&scores, config.default_context)
}

/// Suggest an output format for a lowercased prompt
pub fn suggest_output_format(lowered: &str, config: &Config) -> OutputFormat {
    let scores = KeywordTables::from_config(config).format_scores(lowered);
    format_from_scores(&scores, config.default_output_format)
}

fn context_from_scores(scores: &[(Category, usize)], default: Category) -> ContextMatch {
    let total: usize = scores.iter().map(|(_, hits)| hits).sum();

    match pick_highest(scores) {
        Some((category, hits)) => ContextMatch {
            category,
            confidence: round_confidence(hits as f64 / total as f64),
        },
        None => ContextMatch {
            category: default,
            confidence: 0.0,
        },
    }
}

fn format_from_scores(scores: &[(OutputFormat, usize)], default: OutputFormat) -> OutputFormat {
    pick_highest(scores)
        .map(|(format, _)| format)
        .unwrap_or(default)
}

fn round_confidence(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
