//! Configuration module - keyword tables, templates and limits

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::filter::LevelFilter;

use crate::enhancer::keywords::compile_keyword;
use crate::error::ConfigError;
use crate::model::{Category, OutputFormat};

/// Environment variable naming a config file when none is passed on the command line
pub const ENV_CONFIG_PATH: &str = "PROMPT2JSON_CONFIG";

/// CLI override configuration, applied on top of the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub max_prompt_length: Option<usize>,
    pub min_prompt_length: Option<usize>,
    pub log_level: Option<String>,
    pub enable_logging: Option<bool>,
    pub log_file: Option<PathBuf>,
}

/// Main configuration struct
///
/// Every key is optional in the JSON file. A category or format missing from its
/// keyword table has no keywords.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_context: Category,
    pub default_output_format: OutputFormat,
    pub max_prompt_length: usize,
    pub min_prompt_length: usize,
    pub enable_logging: bool,
    pub log_level: String,
    pub log_file: PathBuf,
    pub context_keywords: BTreeMap<Category, Vec<String>>,
    pub format_keywords: BTreeMap<OutputFormat, Vec<String>>,
    pub solution_templates: BTreeMap<Category, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_context: Category::General,
            default_output_format: OutputFormat::DetailedExplanation,
            max_prompt_length: 1000,
            min_prompt_length: 3,
            enable_logging: false,
            log_level: "info".to_string(),
            log_file: PathBuf::from("logs/prompt_enhancer.log"),
            context_keywords: default_context_keywords(),
            format_keywords: default_format_keywords(),
            solution_templates: default_solution_templates(),
        }
    }
}

impl Config {
    /// Parse a JSON config document
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(content)?;
        Ok(config)
    }

    /// Load and validate config from a file, or the built-in defaults when no
    /// path is given
    pub fn load(path: Option<&Path>) -> Result<Arc<Self>, ConfigError> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(Arc::new(config))
    }

    /// Load, apply CLI overrides and validate
    ///
    /// Without `path`, the file named by `PROMPT2JSON_CONFIG` is used. The file
    /// may hold values that only the overrides make valid.
    pub fn resolve(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Arc<Self>, ConfigError> {
        let env_path = config_path_from_env();
        let path = path.or(env_path.as_deref());

        let mut config = Self::read(path)?;
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(Arc::new(config))
    }

    fn read(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let config = Self::from_json_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(max) = overrides.max_prompt_length {
            self.max_prompt_length = max;
        }
        if let Some(min) = overrides.min_prompt_length {
            self.min_prompt_length = min;
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
        if let Some(enabled) = overrides.enable_logging {
            self.enable_logging = enabled;
        }
        if let Some(file) = overrides.log_file {
            self.log_file = file;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_prompt_length == 0 {
            return Err(ConfigError::Invalid(
                "max_prompt_length must be greater than 0".to_string(),
            ));
        }

        if self.min_prompt_length > self.max_prompt_length {
            return Err(ConfigError::Invalid(format!(
                "min_prompt_length ({}) exceeds max_prompt_length ({})",
                self.min_prompt_length, self.max_prompt_length
            )));
        }

        self.level_filter()?;

        let keywords = self
            .context_keywords
            .values()
            .chain(self.format_keywords.values())
            .flatten();
        for keyword in keywords {
            compile_keyword(keyword)
                .map_err(|e| ConfigError::Invalid(format!("keyword {:?}: {}", keyword, e)))?;
        }
        Ok(())
    }

    /// Parsed `log_level`
    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(self.log_level.trim())
            .map_err(|_| ConfigError::Invalid(format!("unknown log_level '{}'", self.log_level)))
    }

    pub fn keywords_for_context(&self, category: Category) -> &[String] {
        self.context_keywords
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn keywords_for_format(&self, format: OutputFormat) -> &[String] {
        self.format_keywords
            .get(&format)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Solution template for a category, falling back to the built-in one
    pub fn solution_template(&self, category: Category) -> &str {
        self.solution_templates
            .get(&category)
            .map(String::as_str)
            .unwrap_or_else(|| builtin_solution_template(category))
    }
}

/// Config file path from `PROMPT2JSON_CONFIG`, if set and non-empty
pub fn config_path_from_env() -> Option<PathBuf> {
    std::env::var(ENV_CONFIG_PATH)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn to_strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|s| s.to_string()).collect()
}

/// Default category keywords
fn default_context_keywords() -> BTreeMap<Category, Vec<String>> {
    let mut map = BTreeMap::new();
    map.insert(
        Category::Technical,
        to_strings(&[
            "code",
            "coding",
            "programming",
            "program",
            "algorithm",
            "algorithms",
            "software",
            "development",
            "developer",
            "function",
            "api",
            "database",
            "python",
            "javascript",
            "typescript",
            "java",
            "rust",
            "react",
            "vue",
            "web",
            "machine learning",
            "blockchain",
            "technology",
            "computer",
            "server",
            "debug",
        ]),
    );
    map.insert(
        Category::Educational,
        to_strings(&[
            "explain",
            "teach",
            "learn",
            "understand",
            "concept",
            "concepts",
            "lesson",
            "student",
            "beginner",
        ]),
    );
    map.insert(
        Category::Creative,
        to_strings(&[
            "write",
            "story",
            "poem",
            "poetry",
            "creative",
            "imagine",
            "fiction",
            "song",
            "lyrics",
            "novel",
        ]),
    );
    map.insert(
        Category::Analytical,
        to_strings(&[
            "analyze",
            "analyse",
            "analysis",
            "compare",
            "comparison",
            "evaluate",
            "assess",
            "critique",
            "pros and cons",
            "versus",
        ]),
    );
    map.insert(
        Category::Business,
        to_strings(&[
            "strategy",
            "business",
            "marketing",
            "finance",
            "management",
            "startup",
            "revenue",
            "sales",
            "market",
            "customer",
            "investment",
        ]),
    );
    map
}

/// Default output-format indicators
fn default_format_keywords() -> BTreeMap<OutputFormat, Vec<String>> {
    let mut map = BTreeMap::new();
    map.insert(
        OutputFormat::DetailedExplanation,
        to_strings(&["detailed", "in detail", "in depth", "elaborate", "thorough"]),
    );
    map.insert(
        OutputFormat::BulletPoints,
        to_strings(&["bullet", "bullets", "list", "listing"]),
    );
    map.insert(
        OutputFormat::StepByStep,
        to_strings(&[
            "step",
            "steps",
            "how to",
            "guide",
            "tutorial",
            "walkthrough",
            "instructions",
        ]),
    );
    map.insert(
        OutputFormat::ComparativeAnalysis,
        to_strings(&[
            "compare",
            "comparison",
            "versus",
            "vs",
            "difference",
            "differences",
        ]),
    );
    map.insert(
        OutputFormat::Summary,
        to_strings(&[
            "summary",
            "summarize",
            "summarise",
            "overview",
            "tl;dr",
            "briefly",
        ]),
    );
    map.insert(
        OutputFormat::CodeExample,
        to_strings(&["code", "snippet", "implement", "implementation"]),
    );
    map.insert(
        OutputFormat::Table,
        to_strings(&["table", "tabular", "spreadsheet"]),
    );
    map.insert(
        OutputFormat::Essay,
        to_strings(&["essay", "article", "blog post"]),
    );
    map
}

fn builtin_solution_template(category: Category) -> &'static str {
    match category {
        Category::Technical => {
            "Provide a technical explanation of {problem} with working examples and best practices"
        }
        Category::Educational => {
            "Explain {problem} clearly and step by step, in a way that is suitable for learning"
        }
        Category::Creative => "Offer creative ideas and examples for {problem}",
        Category::Analytical => {
            "Present a detailed analysis of {problem} with pros, cons and a conclusion"
        }
        Category::Business => {
            "Focus on practical applications and business value when addressing {problem}"
        }
        Category::General => {
            "Provide comprehensive information covering the key aspects of {problem}"
        }
    }
}

/// Default per-category solution templates
fn default_solution_templates() -> BTreeMap<Category, String> {
    Category::ALL
        .iter()
        .map(|c| (*c, builtin_solution_template(*c).to_string()))
        .collect()
}
