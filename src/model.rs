//! Value records produced by the enhancer

use std::fmt;

use serde::{Deserialize, Serialize};

/// Schema tag written into every record
pub const ENHANCEMENT_VERSION: &str = "1.0.0";

/// Prompt category. Declaration order is the tie-break priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Technical,
    Educational,
    Creative,
    Analytical,
    Business,
    General,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Technical,
        Category::Educational,
        Category::Creative,
        Category::Analytical,
        Category::Business,
        Category::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Technical => "technical",
            Self::Educational => "educational",
            Self::Creative => "creative",
            Self::Analytical => "analytical",
            Self::Business => "business",
            Self::General => "general",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Suggested presentation style. Declaration order is the tie-break priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OutputFormat {
    #[serde(rename = "detailed explanation")]
    DetailedExplanation,
    #[serde(rename = "bullet points")]
    BulletPoints,
    #[serde(rename = "step-by-step")]
    StepByStep,
    #[serde(rename = "comparative analysis")]
    ComparativeAnalysis,
    #[serde(rename = "summary")]
    Summary,
    #[serde(rename = "code example")]
    CodeExample,
    #[serde(rename = "table")]
    Table,
    #[serde(rename = "essay")]
    Essay,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 8] = [
        OutputFormat::DetailedExplanation,
        OutputFormat::BulletPoints,
        OutputFormat::StepByStep,
        OutputFormat::ComparativeAnalysis,
        OutputFormat::Summary,
        OutputFormat::CodeExample,
        OutputFormat::Table,
        OutputFormat::Essay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DetailedExplanation => "detailed explanation",
            Self::BulletPoints => "bullet points",
            Self::StepByStep => "step-by-step",
            Self::ComparativeAnalysis => "comparative analysis",
            Self::Summary => "summary",
            Self::CodeExample => "code example",
            Self::Table => "table",
            Self::Essay => "essay",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The structured form of a prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhancedPrompt {
    pub context: Category,
    pub problem: String,
    pub expected_solution: String,
    pub output_format: OutputFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// RFC 3339 timestamp of the call
    pub timestamp: String,
    pub enhancement_version: String,
    /// Wall-clock analysis time in milliseconds, e.g. "0.042"
    pub processing_time: String,
    pub detected_context: Category,
    pub confidence_score: f64,
}

/// Full response document: `{ original_prompt, enhanced_prompt, metadata }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancementRecord {
    pub original_prompt: String,
    pub enhanced_prompt: EnhancedPrompt,
    pub metadata: Metadata,
}
