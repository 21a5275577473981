//! Client for the transactional mail API the contact relay forwards to.

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail provider request failed")]
    Request(#[from] reqwest::Error),
    #[error("mail provider returned {0}")]
    Status(StatusCode),
}

/// A validated submission from the contact form.
pub struct ContactMessage<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub message: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: Option<String>,
}

/// Forward a contact message through the mail API, with the visitor's
/// address as reply-to. Returns the provider's message id when it sends one.
pub async fn send_contact_email(
    http: &reqwest::Client,
    api_url: &str,
    api_key: &str,
    from_address: &str,
    to_address: &str,
    message: &ContactMessage<'_>,
) -> Result<Option<String>, MailError> {
    let subject = format!("Portfolio message from {}", message.name);
    let text = format!(
        "Name: {}\nEmail: {}\n\n{}",
        message.name, message.email, message.message
    );

    let response = http
        .post(format!("{api_url}/emails"))
        .bearer_auth(api_key)
        .json(&json!({
            "from": format!("Portfolio Contact <{from_address}>"),
            "to": [to_address],
            "reply_to": message.email,
            "subject": subject,
            "text": text,
        }))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(MailError::Status(status));
    }

    // The provider answers with a message id; tolerate its absence.
    let id = response
        .json::<SendResponse>()
        .await
        .ok()
        .and_then(|body| body.id);

    Ok(id)
}
