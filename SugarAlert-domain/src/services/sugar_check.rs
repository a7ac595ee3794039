use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::entities::{AlertDecision, Reading};
use sugar_alert_data::llm::{LanguageModel, LlmError, ModelReply, ModelRequest, ToolDeclaration, ToolInvocation};
use sugar_alert_data::sms::AlertDispatcher;

/// Name of the single tool offered to the model
pub const ALERT_TOOL_NAME: &str = "send_alert";

/// Reply the model is told to give when no alert is needed
pub const NO_ALERT_MESSAGE: &str = "No alert needed.";

/// Policy handed to the model. The 180 mg/dL threshold lives here only.
pub const SYSTEM_INSTRUCTION: &str = "You are an expert AI Health Coach focused on diabetic patient safety. \
Target max sugar is 140 mg/dL. You MUST call the 'send_alert' function \
with a concrete action plan if the sugar is above 180 mg/dL. \
Otherwise, reply with 'No alert needed.'";

/// Sugar check errors
#[derive(Debug, Error)]
pub enum SugarCheckError {
    /// The model could not be reached or answered with something unusable
    #[error("{0}")]
    Model(#[from] LlmError),
}

/// Declaration of the `send_alert` tool
pub fn alert_tool() -> ToolDeclaration {
    ToolDeclaration {
        name: ALERT_TOOL_NAME.to_string(),
        description: "Sends a critical, personalized health alert via SMS.".to_string(),
        parameters: json!({
            "type": "OBJECT",
            "properties": {
                "recipient_number": {
                    "type": "STRING",
                    "description": "The user's mobile number."
                },
                "message_body": {
                    "type": "STRING",
                    "description": "The personalized action message."
                }
            },
            "required": ["recipient_number", "message_body"]
        }),
    }
}

/// Render a reading as the user turn sent to the model
pub fn compose_prompt(reading: &Reading) -> String {
    let target_max = reading
        .user_target_max
        .map(|value| value.to_string())
        .unwrap_or_else(|| "Not provided".to_string());

    format!(
        "New sugar reading logged. Analyze and decide if an alert is needed.\n\
         - Current Sugar Level: {} mg/dL\n\
         - User Target Max: {} mg/dL\n\
         - Time Since Last Meal: {}\n\
         - Last Meal Carbs: {}\n\
         - Recent Activity: {}\n\
         The recipient number is {}.",
        reading.current_sugar,
        target_max,
        reading.time_since_meal,
        reading.last_meal_carbs,
        reading.recent_activity,
        reading.recipient_number,
    )
}

/// Asks the model about a reading and sends whatever alerts it requests
pub struct SugarCheckService {
    model: Arc<dyn LanguageModel>,
    dispatcher: Arc<dyn AlertDispatcher>,
}

impl SugarCheckService {
    pub fn new(model: Arc<dyn LanguageModel>, dispatcher: Arc<dyn AlertDispatcher>) -> Self {
        Self { model, dispatcher }
    }

    /// Build the single-turn request for a reading
    pub fn build_request(reading: &Reading) -> ModelRequest {
        ModelRequest {
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            prompt: compose_prompt(reading),
            tools: vec![alert_tool()],
        }
    }

    /// Run one check end to end
    #[instrument(skip_all, fields(sugar = reading.current_sugar))]
    pub async fn check(&self, reading: &Reading) -> Result<AlertDecision, SugarCheckError> {
        let request = Self::build_request(reading);
        let reply = self.model.generate(&request).await?;
        Ok(self.interpret(reply).await)
    }

    /// Turn the model's reply into a decision, dispatching requested alerts
    ///
    /// The recipient comes from the model's arguments, not from the reading.
    pub async fn interpret(&self, reply: ModelReply) -> AlertDecision {
        match reply {
            ModelReply::FreeText(text) => {
                info!("Model replied without requesting an alert");
                AlertDecision::no_alert(text)
            }
            ModelReply::ToolInvocations(calls) if calls.is_empty() => {
                AlertDecision::no_alert(NO_ALERT_MESSAGE)
            }
            ModelReply::ToolInvocations(calls) => {
                let mut decision = AlertDecision {
                    triggered: true,
                    message: NO_ALERT_MESSAGE.to_string(),
                    deliveries: Vec::new(),
                };

                for call in calls.iter().filter(|call| is_alert_call(call)) {
                    let result = self
                        .dispatcher
                        .send_alert(call.str_arg("recipient_number"), call.str_arg("message_body"))
                        .await;
                    if !result.delivered {
                        warn!("Alert requested by model was not delivered: {}", result.detail);
                    }
                    decision.message = result.detail.clone();
                    decision.deliveries.push(result);
                }

                let ignored = calls.len() - decision.deliveries.len();
                if ignored > 0 {
                    warn!("Ignored {} invocation(s) of undeclared tools", ignored);
                }

                decision
            }
        }
    }
}

fn is_alert_call(call: &ToolInvocation) -> bool {
    call.name == ALERT_TOOL_NAME
}
