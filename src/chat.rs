//! Payload shapes of the paid chat endpoint.
//!
//! The payment layer carries these bodies without looking at them; only the CLI
//! reads them.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use x402_chat_reqwest::HttpResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// `POST` body: `{"messages":[{"role":"user","content":"..."}]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    pub fn single<S: Into<String>>(content: S) -> Self {
        Self {
            messages: vec![ChatMessage::user(content)],
        }
    }
}

/// What the endpoint answers: assistant messages on success, `{"error": ...}` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatReply {
    Messages { messages: Vec<ChatMessage> },
    Error { error: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Chat endpoint returned {status}: {message}")]
    Endpoint { status: StatusCode, message: String },
    #[error("Unexpected chat reply: {0}")]
    UnexpectedReply(#[source] serde_json::Error),
    #[error("Chat reply contained no assistant message")]
    EmptyReply,
}

/// Extracts the assistant's answer from the final response.
pub fn read_reply(response: &HttpResponse) -> Result<String, ChatError> {
    let reply = response.json::<ChatReply>();
    if !response.status.is_success() {
        let message = match reply {
            Ok(ChatReply::Error { error }) => error,
            _ => response.text(),
        };
        return Err(ChatError::Endpoint {
            status: response.status,
            message,
        });
    }
    match reply.map_err(ChatError::UnexpectedReply)? {
        ChatReply::Messages { messages } => messages
            .into_iter()
            .rev()
            .find(|m| m.role == ChatRole::Assistant)
            .map(|m| m.content)
            .ok_or(ChatError::EmptyReply),
        ChatReply::Error { error } => Err(ChatError::Endpoint {
            status: response.status,
            message: error,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: StatusCode, body: &str) -> HttpResponse {
        let mut response = HttpResponse::new(status);
        response.body = body.to_string().into();
        response
    }

    #[test]
    fn test_request_shape() {
        let request = ChatRequest::single("Hello!");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "messages": [{ "role": "user", "content": "Hello!" }] })
        );
    }

    #[test]
    fn test_read_assistant_reply() {
        let ok = response(
            StatusCode::OK,
            r#"{"messages":[{"role":"assistant","content":"Sure, happy to help."}]}"#,
        );
        assert_eq!(read_reply(&ok).unwrap(), "Sure, happy to help.");
    }

    #[test]
    fn test_read_error_reply() {
        let failed = response(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error":"Failed to get AI response"}"#,
        );
        let err = read_reply(&failed).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Chat endpoint returned 500 Internal Server Error: Failed to get AI response"
        );
    }

    #[test]
    fn test_non_json_error_body_is_kept() {
        let failed = response(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(matches!(
            read_reply(&failed),
            Err(ChatError::Endpoint { message, .. }) if message == "upstream down"
        ));
    }

    #[test]
    fn test_reply_without_assistant_message() {
        let ok = response(StatusCode::OK, r#"{"messages":[]}"#);
        assert!(matches!(read_reply(&ok), Err(ChatError::EmptyReply)));
    }
}
