use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use secrecy::{ExposeSecret, Secret};
use warden_core::{Email, EmailClient, EmailDeliveryError, OutgoingEmail};

use crate::config::EmailClientSettings;

pub struct PostmarkEmailClient {
    http_client: Client,
    base_url: String,
    sender: Email,
    authorization_token: Secret<String>,
}

impl PostmarkEmailClient {
    pub fn new(
        base_url: String,
        sender: Email,
        authorization_token: Secret<String>,
        http_client: Client,
    ) -> Self {
        Self {
            http_client,
            base_url,
            sender,
            authorization_token,
        }
    }

    pub fn from_settings(settings: &EmailClientSettings) -> Result<Self, String> {
        let sender = Email::try_from(settings.sender.as_str()).map_err(|e| e.to_string())?;
        let http_client = build_http_client(settings.timeout())?;

        Ok(Self::new(
            settings.base_url.clone(),
            sender,
            settings.auth_token.clone(),
            http_client,
        ))
    }
}

pub fn build_http_client(timeout: Duration) -> Result<Client, String> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| e.to_string())
}

#[async_trait::async_trait]
impl EmailClient for PostmarkEmailClient {
    #[tracing::instrument(
        name = "PostmarkEmailClient::send",
        skip_all,
        fields(tag = email.tag)
    )]
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailDeliveryError> {
        let url = Url::parse(&self.base_url)
            .and_then(|base| base.join("/email"))
            .map_err(|e| EmailDeliveryError::Unavailable(e.to_string()))?;

        let request_body = SendEmailRequest {
            from: self.sender.as_str(),
            to: email.recipient.as_str(),
            subject: &email.subject,
            html_body: &email.html_body,
            tag: email.tag,
            message_stream: MESSAGE_STREAM,
        };

        let response = self
            .http_client
            .post(url)
            .header(
                POSTMARK_AUTH_HEADER,
                self.authorization_token.expose_secret(),
            )
            .json(&request_body)
            .send()
            .await
            .map_err(|e| EmailDeliveryError::Unavailable(e.to_string()))?;

        let status = response.status();
        // Error bodies are not always JSON; fall back to the status line.
        let reply = response
            .json::<PostmarkResponse>()
            .await
            .unwrap_or_else(|_| PostmarkResponse {
                error_code: 0,
                message: status.to_string(),
                message_id: None,
            });

        if status.is_success() {
            tracing::info!(message_id = ?reply.message_id, "Email accepted by Postmark");
            return Ok(());
        }

        tracing::warn!(
            status = status.as_u16(),
            error_code = reply.error_code,
            "Postmark refused the email"
        );
        Err(classify_failure(status, reply))
    }
}

/// 429 and 5xx clear up on their own. 401 needs an operator to fix the
/// server token, after which the same message goes through. Every other
/// 4xx is about the message itself.
fn classify_failure(status: StatusCode, reply: PostmarkResponse) -> EmailDeliveryError {
    if status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::UNAUTHORIZED
    {
        EmailDeliveryError::Unavailable(format!("{status}: {}", reply.message))
    } else {
        EmailDeliveryError::Rejected {
            code: reply.error_code,
            message: reply.message,
        }
    }
}

const MESSAGE_STREAM: &str = "outbound";
const POSTMARK_AUTH_HEADER: &str = "X-Postmark-Server-Token";

#[derive(serde::Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
    tag: &'a str,
    message_stream: &'a str,
}

#[derive(serde::Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct PostmarkResponse {
    #[serde(default)]
    error_code: i64,
    #[serde(default)]
    message: String,
    #[serde(rename = "MessageID")]
    message_id: Option<String>,
}
