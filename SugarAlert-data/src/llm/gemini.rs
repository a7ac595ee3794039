use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::fmt;
use tracing::{debug, instrument, warn};

use super::{LanguageModel, LlmError, ModelReply, ModelRequest, ToolInvocation};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Gemini `generateContent` client
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_base: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the client at a different host, e.g. a proxy
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_base, self.model)
    }

    /// Build the JSON body for a single-turn request
    pub fn build_payload(request: &ModelRequest) -> Value {
        let mut payload = json!({
            "systemInstruction": { "parts": [{ "text": request.system_instruction }] },
            "contents": [{ "role": "user", "parts": [{ "text": request.prompt }] }],
        });

        if !request.tools.is_empty() {
            let declarations: Vec<Value> = request
                .tools
                .iter()
                .map(|tool| {
                    json!({
                        "name": tool.name,
                        "description": tool.description,
                        "parameters": tool.parameters,
                    })
                })
                .collect();
            payload["tools"] = json!([{ "functionDeclarations": declarations }]);
        }

        payload
    }

    /// Interpret a `generateContent` response body
    ///
    /// Function calls take precedence over any text in the same candidate.
    pub fn parse_reply(body: &str) -> Result<ModelReply, LlmError> {
        let value: Value = serde_json::from_str(body)?;

        if let Some(error) = value.get("error") {
            return Err(LlmError::Api {
                status: error["code"]
                    .as_u64()
                    .and_then(|code| u16::try_from(code).ok())
                    .unwrap_or(0),
                message: error["message"].as_str().unwrap_or("Unknown error").to_string(),
            });
        }

        let candidate = value["candidates"]
            .as_array()
            .and_then(|candidates| candidates.first())
            .ok_or_else(|| LlmError::MalformedResponse("response contained no candidates".to_string()))?;

        let parts = candidate["content"]["parts"].as_array().cloned().unwrap_or_default();

        let invocations: Vec<ToolInvocation> = parts
            .iter()
            .filter_map(|part| part.get("functionCall"))
            .filter_map(|call| {
                let name = call["name"].as_str()?;
                let args = call.get("args").cloned().unwrap_or_else(|| json!({}));
                Some(ToolInvocation::new(name, args))
            })
            .collect();

        if !invocations.is_empty() {
            return Ok(ModelReply::ToolInvocations(invocations));
        }

        let text: String = parts.iter().filter_map(|part| part["text"].as_str()).collect();
        Ok(ModelReply::FreeText(text))
    }
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    #[instrument(skip_all, fields(model = %self.model))]
    async fn generate(&self, request: &ModelRequest) -> Result<ModelReply, LlmError> {
        let payload = Self::build_payload(request);
        debug!("Sending generateContent request");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
                .unwrap_or(body);
            warn!("Gemini returned status {}: {}", status, message);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Self::parse_reply(&body)
    }
}
