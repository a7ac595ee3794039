//! Language model boundary
//!
//! A model is asked one question with a set of declared tools and answers
//! either with free text or with one or more tool invocations.

mod errors;
mod gemini;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use errors::LlmError;
pub use gemini::{GeminiClient, DEFAULT_GEMINI_API_BASE, DEFAULT_GEMINI_MODEL};

/// A callable the model may ask the caller to execute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    /// JSON schema describing the arguments
    pub parameters: Value,
}

/// A structured request from the model to run a declared tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

impl ToolInvocation {
    pub fn new(name: impl Into<String>, args: Value) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// String argument by key; absent or non-string arguments read as empty
    pub fn str_arg(&self, key: &str) -> &str {
        self.args.get(key).and_then(Value::as_str).unwrap_or("")
    }
}

/// What the model answered
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    /// Plain text answer, no tool requested
    FreeText(String),
    /// One or more tool invocations, in the order the model produced them
    ToolInvocations(Vec<ToolInvocation>),
}

/// A single-turn request to the model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub system_instruction: String,
    pub prompt: String,
    pub tools: Vec<ToolDeclaration>,
}

/// Hosted language model
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send one request and wait for the reply
    async fn generate(&self, request: &ModelRequest) -> Result<ModelReply, LlmError>;
}
