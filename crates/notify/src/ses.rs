//! AWS SES (v2 API) mail transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Url};
use serde::Deserialize;
use serde_json::json;
use sprintdigest_core::MessageId;
use tracing::debug;

use crate::sigv4::{self, Credentials, SigningRequest};
use crate::transport::{MailTransport, OutgoingEmail, SendError};

const SEND_EMAIL_PATH: &str = "/v2/email/outbound-emails";
const SERVICE: &str = "ses";

/// SES connection settings.
#[derive(Debug, Clone)]
pub struct SesConfig {
    /// AWS region, e.g. `us-east-1`
    pub region: String,

    /// Access credentials
    pub credentials: Credentials,

    /// Endpoint override; defaults to `https://email.<region>.amazonaws.com`
    pub endpoint: Option<String>,

    /// Request timeout
    pub timeout: Duration,
}

impl SesConfig {
    /// Settings for the regional endpoint with a 30 second timeout.
    pub fn new(region: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            region: region.into(),
            credentials,
            endpoint: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Override the endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Sends email through the SES v2 `SendEmail` operation.
pub struct SesTransport {
    client: Client,
    config: SesConfig,
    url: Url,
    host: String,
}

impl SesTransport {
    /// Create a transport.
    pub fn new(config: SesConfig) -> Result<Self, SendError> {
        let base = config
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("https://email.{}.amazonaws.com", config.region));
        let url = Url::parse(&base)
            .and_then(|u| u.join(SEND_EMAIL_PATH))
            .map_err(|e| SendError::InvalidEndpoint(format!("{}: {}", base, e)))?;

        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(SendError::InvalidEndpoint(format!("{} has no host", base)));
            }
        };

        let client = ClientBuilder::new().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            config,
            url,
            host,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    #[serde(rename = "MessageId")]
    message_id: String,
}

#[async_trait]
impl MailTransport for SesTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<MessageId, SendError> {
        let payload = serde_json::to_vec(&json!({
            "FromEmailAddress": email.from,
            "Destination": { "ToAddresses": email.to },
            "Content": {
                "Simple": {
                    "Subject": { "Data": email.subject, "Charset": "UTF-8" },
                    "Body": { "Text": { "Data": email.body, "Charset": "UTF-8" } },
                }
            },
        }))
        .map_err(|e| SendError::Malformed(e.to_string()))?;

        let signed = sigv4::sign(
            &self.config.credentials,
            &self.config.region,
            SERVICE,
            &SigningRequest {
                method: "POST",
                host: &self.host,
                path: self.url.path(),
                headers: &[("content-type", "application/json")],
                payload: &payload,
            },
            chrono::Utc::now(),
        )?;

        let mut request = self
            .client
            .post(self.url.clone())
            .header("content-type", "application/json");
        for (name, value) in signed {
            request = request.header(name, value);
        }

        debug!("Sending SES email to {:?}", email.to);
        let response = request.body(payload).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SendError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SendEmailResponse =
            serde_json::from_str(&body).map_err(|e| SendError::Malformed(e.to_string()))?;
        Ok(MessageId::new(parsed.message_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn email() -> OutgoingEmail {
        OutgoingEmail {
            from: "digest@example.com".to_string(),
            to: vec!["alice@example.com".to_string()],
            subject: "Task Progress Update".to_string(),
            body: "Hello alice".to_string(),
        }
    }

    fn transport(server: &MockServer) -> SesTransport {
        let config = SesConfig::new("us-east-1", Credentials::new("AKID", "secret"))
            .with_endpoint(server.uri());
        SesTransport::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_send_returns_message_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/email/outbound-emails"))
            .and(header_exists("authorization"))
            .and(header_exists("x-amz-date"))
            .and(body_partial_json(serde_json::json!({
                "FromEmailAddress": "digest@example.com",
                "Destination": { "ToAddresses": ["alice@example.com"] }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "MessageId": "0100018c-abc"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let id = transport(&server).send(&email()).await.unwrap();
        assert_eq!(id.as_str(), "0100018c-abc");
    }

    #[tokio::test]
    async fn test_rejection_is_send_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string(r#"{"message":"Missing final '@domain'"}"#),
            )
            .mount(&server)
            .await;

        let mut message = email();
        message.to = vec![String::new()];
        let err = transport(&server).send(&message).await.unwrap_err();

        assert!(matches!(err, SendError::Rejected { status: 400, ref body } if body.contains("@domain")));
    }

    #[test]
    fn test_invalid_endpoint() {
        let config = |endpoint: &str| {
            SesConfig::new("us-east-1", Credentials::new("AKID", "secret")).with_endpoint(endpoint)
        };

        let err = SesTransport::new(config("not a url")).err().unwrap();
        assert!(matches!(err, SendError::InvalidEndpoint(ref msg) if msg.starts_with("not a url")));

        let err = SesTransport::new(config("file:///tmp")).err().unwrap();
        assert!(matches!(err, SendError::InvalidEndpoint(ref msg) if msg.ends_with("has no host")));
    }

    #[test]
    fn test_default_endpoint() {
        let config = SesConfig::new("eu-west-1", Credentials::new("AKID", "secret"));
        let transport = SesTransport::new(config).unwrap();
        assert_eq!(transport.host, "email.eu-west-1.amazonaws.com");
        assert_eq!(
            transport.url.as_str(),
            "https://email.eu-west-1.amazonaws.com/v2/email/outbound-emails"
        );
    }
}
