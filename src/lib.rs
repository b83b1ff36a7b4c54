//! prompt2json library - turns plain prompts into structured JSON for AI chats

pub mod config;
pub mod enhancement_log;
pub mod enhancer;
pub mod error;
pub mod model;
pub mod output;

// Re-export commonly used types
pub use config::{Config, ConfigOverrides};
pub use enhancer::{EnhancerServer, PromptEnhancer};
pub use error::{ConfigError, ValidationError};
pub use model::{Category, EnhancedPrompt, EnhancementRecord, Metadata, OutputFormat};
