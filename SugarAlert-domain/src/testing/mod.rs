// Testing utilities and stand-in implementations for the domain layer
// This module is only available in tests or when the "mock" feature is enabled

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Local};
use std::sync::{Mutex, RwLock};
use std::time::Duration;

use sugar_alert_data::llm::{LanguageModel, LlmError, ModelReply, ModelRequest, ToolInvocation};
use sugar_alert_data::sms::{AlertDispatcher, DeliveryResult};

use crate::scheduler::Clock;

/// A clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Local>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Local>) {
        match self.now.write() {
            Ok(mut guard) => *guard = now,
            Err(poisoned) => *poisoned.into_inner() = now,
        }
    }

    pub fn advance(&self, by: ChronoDuration) {
        let next = self.now() + by;
        self.set(next);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        match self.now.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Dispatcher that records every call and answers with a fixed result
pub struct RecordingDispatcher {
    result: DeliveryResult,
    calls: Mutex<Vec<(String, String)>>,
}

impl RecordingDispatcher {
    /// Every delivery succeeds with status 200
    pub fn succeeding() -> Self {
        Self::with_result(DeliveryResult::success(200, "{\"status\":\"sent\"}"))
    }

    /// Every delivery fails with the given error text
    pub fn failing(error: &str) -> Self {
        Self::with_result(DeliveryResult::failure(None, error))
    }

    pub fn with_result(result: DeliveryResult) -> Self {
        Self {
            result,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `(recipient, message)` pairs in call order
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    /// Poll until at least `count` calls were recorded or `timeout` elapses
    pub async fn wait_for_calls(&self, count: usize, timeout: Duration) -> Vec<(String, String)> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let calls = self.calls();
            if calls.len() >= count || tokio::time::Instant::now() >= deadline {
                return calls;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl AlertDispatcher for RecordingDispatcher {
    async fn send_alert(&self, recipient_number: &str, message_body: &str) -> DeliveryResult {
        self.calls
            .lock()
            .unwrap()
            .push((recipient_number.to_string(), message_body.to_string()));
        self.result.clone()
    }
}

enum StubReply {
    Reply(ModelReply),
    Fail(String),
}

/// Language model that always gives the same answer
pub struct StubLanguageModel {
    reply: StubReply,
    requests: Mutex<Vec<ModelRequest>>,
}

impl StubLanguageModel {
    pub fn free_text(text: &str) -> Self {
        Self::new(StubReply::Reply(ModelReply::FreeText(text.to_string())))
    }

    pub fn invoking(calls: Vec<ToolInvocation>) -> Self {
        Self::new(StubReply::Reply(ModelReply::ToolInvocations(calls)))
    }

    /// Every request fails with an API error carrying `message`
    pub fn failing(message: &str) -> Self {
        Self::new(StubReply::Fail(message.to_string()))
    }

    fn new(reply: StubReply) -> Self {
        Self {
            reply,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for StubLanguageModel {
    async fn generate(&self, request: &ModelRequest) -> Result<ModelReply, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            StubReply::Reply(reply) => Ok(reply.clone()),
            StubReply::Fail(message) => Err(LlmError::Api {
                status: 503,
                message: message.clone(),
            }),
        }
    }
}
