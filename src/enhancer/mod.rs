//! Prompt Enhancer module
//! Converts plain prompts into structured JSON records and serves them over HTTP

pub mod keywords;
pub mod problem;
pub mod prompt_enhancer;
pub mod server;
pub mod templates;

pub use prompt_enhancer::{Analysis, ContextMatch, PromptEnhancer};
pub use server::EnhancerServer;
