use async_trait::async_trait;
use reqwest::Client;
use std::fmt;
use tracing::{info, instrument, warn};

use super::{AlertDispatcher, DeliveryResult};

/// Dispatcher backed by a form-encoded HTTP SMS gateway
#[derive(Clone)]
pub struct SmsGatewayDispatcher {
    client: Client,
    gateway_url: String,
    api_key: String,
}

impl SmsGatewayDispatcher {
    /// Create a dispatcher posting to `gateway_url` with the given API key
    pub fn new(client: Client, gateway_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            gateway_url: gateway_url.into(),
            api_key: api_key.into(),
        }
    }

    /// The endpoint messages are posted to
    pub fn gateway_url(&self) -> &str {
        &self.gateway_url
    }
}

impl fmt::Debug for SmsGatewayDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmsGatewayDispatcher")
            .field("gateway_url", &self.gateway_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl AlertDispatcher for SmsGatewayDispatcher {
    #[instrument(skip_all, fields(gateway = %self.gateway_url))]
    async fn send_alert(&self, recipient_number: &str, message_body: &str) -> DeliveryResult {
        let form = [
            ("apikey", self.api_key.as_str()),
            ("recipients", recipient_number),
            ("message", message_body),
        ];

        let response = match self.client.post(&self.gateway_url).form(&form).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("SMS gateway unreachable: {}", e);
                return DeliveryResult::failure(None, e);
            }
        };

        let status = response.status();
        if let Err(e) = response.error_for_status_ref() {
            warn!("SMS gateway rejected message with status {}", status);
            return DeliveryResult::failure(Some(status.as_u16()), e);
        }

        match response.text().await {
            Ok(body) => {
                info!("SMS accepted by gateway with status {}", status);
                DeliveryResult::success(status.as_u16(), &body)
            }
            Err(e) => {
                warn!("Failed to read SMS gateway response: {}", e);
                DeliveryResult::failure(Some(status.as_u16()), e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, http::StatusCode, routing::post, Form, Router};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    type Captured = Arc<Mutex<Vec<HashMap<String, String>>>>;

    /// Start a throwaway gateway that records submitted forms and answers with a fixed reply
    async fn spawn_gateway(status: StatusCode, body: &'static str) -> (String, Captured) {
        let captured: Captured = Arc::new(Mutex::new(Vec::new()));

        async fn receive(
            State((captured, status, body)): State<(Captured, StatusCode, &'static str)>,
            Form(form): Form<HashMap<String, String>>,
        ) -> (StatusCode, &'static str) {
            captured.lock().unwrap().push(form);
            (status, body)
        }

        let app = Router::new()
            .route("/send", post(receive))
            .with_state((captured.clone(), status, body));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/send", addr), captured)
    }

    #[tokio::test]
    async fn test_send_alert_posts_form_fields() {
        let (url, captured) = spawn_gateway(StatusCode::OK, "{\"result\":\"queued\"}").await;
        let dispatcher = SmsGatewayDispatcher::new(Client::new(), url, "secret-key");

        let result = dispatcher.send_alert("+15551234567", "Take 2 units now").await;

        assert!(result.delivered);
        assert_eq!(result.status_code, Some(200));
        assert_eq!(
            result.detail,
            "SMS Success! Status: 200. Response: {\"result\":\"queued\"}..."
        );

        let forms = captured.lock().unwrap();
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0]["apikey"], "secret-key");
        assert_eq!(forms[0]["recipients"], "+15551234567");
        assert_eq!(forms[0]["message"], "Take 2 units now");
    }

    #[tokio::test]
    async fn test_send_alert_reports_http_error() {
        let (url, _captured) = spawn_gateway(StatusCode::UNAUTHORIZED, "bad key").await;
        let dispatcher = SmsGatewayDispatcher::new(Client::new(), url, "wrong");

        let result = dispatcher.send_alert("+15551234567", "hello").await;

        assert!(!result.delivered);
        assert_eq!(result.status_code, Some(401));
        assert!(result.detail.starts_with("SMS API Error:"));
    }

    #[tokio::test]
    async fn test_send_alert_reports_unreachable_gateway() {
        // Reserve a port, then release it so nothing is listening there
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let dispatcher =
            SmsGatewayDispatcher::new(Client::new(), format!("http://{}/send", addr), "key");
        let result = dispatcher.send_alert("+15551234567", "hello").await;

        assert!(!result.delivered);
        assert_eq!(result.status_code, None);
        assert!(result.detail.starts_with("SMS API Error:"));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let dispatcher = SmsGatewayDispatcher::new(Client::new(), "http://gateway", "top-secret");
        let debug = format!("{:?}", dispatcher);
        assert!(!debug.contains("top-secret"));
        assert!(debug.contains("http://gateway"));
    }
}
