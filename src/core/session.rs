//! Chat session: one command in, one agent reply (text plus cited sources)
//! out. Keeps the running conversation so follow-up commands have context.

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use serde_json::{Value, json};
use thiserror::Error;

use super::config::Config;
use super::message::Source;

const SYSTEM_INSTRUCTION: &str = "You are CodeMaster, an expert AI programming assistant. \
Provide clear, efficient, well-commented, and idiomatic code solutions across languages. \
Explain algorithms, data structures, and the logic behind your solutions, and help with \
debugging. Format ALL code snippets, commands, and technical terms using Markdown \
(```lang ... ``` for code blocks, `name()` for inline code). If a problem is \
underspecified, ask clarifying questions before attempting a solution. Maintain a \
helpful, encouraging, and professional tone.";

/// Errors from the chat session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{0}")]
    Auth(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("request failed: {0}")]
    Transport(String),
}

/// An agent turn: reply text plus any grounding citations.
#[derive(Debug, Clone)]
pub struct AgentReply {
    pub text: String,
    pub sources: Vec<Source>,
}

/// One conversation with the model. Created per run; never global.
pub struct Session {
    client: Client<OpenAIConfig>,
    model: String,
    history: Vec<Value>,
}

impl Session {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::with_config(config.openai_config.clone()),
            model: config.model_id.clone(),
            history: vec![json!({
                "role": "system",
                "content": SYSTEM_INSTRUCTION,
            })],
        }
    }

    /// Send one user command and return the agent's reply.
    pub async fn send_command(&mut self, text: &str) -> Result<AgentReply, SessionError> {
        self.history.push(json!({
            "role": "user",
            "content": text,
        }));

        let response: Value = self
            .client
            .chat()
            .create_byot(json!({
                "model": &self.model,
                "messages": &self.history,
            }))
            .await
            .map_err(map_api_error)?;

        if let Some(err) = response.get("error") {
            let msg = err
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("Unknown error");
            return Err(SessionError::Api(msg.to_string()));
        }

        let message = &response["choices"][0]["message"];
        let content = extract_content(message)
            .ok_or_else(|| SessionError::Api("response contained no content".to_string()))?;
        let sources = extract_sources(message);

        self.history.push(json!({
            "role": "assistant",
            "content": &content,
        }));

        Ok(AgentReply {
            text: content,
            sources,
        })
    }
}

fn map_api_error<E: std::fmt::Display>(e: E) -> SessionError {
    let s = e.to_string();
    if s.contains("401") {
        return SessionError::Auth(
            "API error (401): invalid or missing OPENROUTER_API_KEY (see .env)".to_string(),
        );
    }
    if s.contains("\"error\"") {
        if let Some((_, rest)) = s.split_once("\"message\":\"") {
            if let Some((msg, _)) = rest.split_once('"') {
                return SessionError::Api(msg.to_string());
            }
        }
    }
    SessionError::Transport(s)
}

/// Extract text content from an API message.
/// Handles both string content and array-of-blocks format.
fn extract_content(message: &Value) -> Option<String> {
    let content = message.get("content")?;
    if let Some(s) = content.as_str() {
        return Some(s.to_string());
    }
    if let Some(arr) = content.as_array() {
        for block in arr {
            if let Some(text) = block.get("text").and_then(|t| t.as_str()) {
                return Some(text.to_string());
            }
        }
    }
    None
}

/// Extract URL citations from a message's `annotations`, deduplicated by URI.
fn extract_sources(message: &Value) -> Vec<Source> {
    let Some(annotations) = message.get("annotations").and_then(|a| a.as_array()) else {
        return Vec::new();
    };
    let mut sources: Vec<Source> = Vec::new();
    for entry in annotations {
        let citation = entry.get("url_citation").unwrap_or(entry);
        let Some(url) = citation.get("url").and_then(|u| u.as_str()) else {
            continue;
        };
        if sources.iter().any(|s| s.uri == url) {
            continue;
        }
        let title = citation
            .get("title")
            .and_then(|t| t.as_str())
            .unwrap_or("")
            .to_string();
        sources.push(Source {
            uri: url.to_string(),
            title,
        });
    }
    sources
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_content_string_direct() {
        let msg = json!({"role": "assistant", "content": "Hello world"});
        assert_eq!(extract_content(&msg), Some("Hello world".to_string()));
    }

    #[test]
    fn extract_content_array_of_blocks() {
        let msg = json!({
            "role": "assistant",
            "content": [{"type": "text", "text": "Response text"}]
        });
        assert_eq!(extract_content(&msg), Some("Response text".to_string()));
    }

    #[test]
    fn extract_content_missing_or_empty() {
        assert_eq!(extract_content(&json!({"role": "assistant"})), None);
        assert_eq!(
            extract_content(&json!({"role": "assistant", "content": []})),
            None
        );
    }

    #[test]
    fn extract_sources_url_citations() {
        let msg = json!({
            "annotations": [
                {"type": "url_citation", "url_citation": {
                    "url": "https://docs.rs/regex", "title": "regex - Rust"
                }},
                {"type": "url_citation", "url_citation": {
                    "url": "https://example.com"
                }}
            ]
        });
        let sources = extract_sources(&msg);
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].uri, "https://docs.rs/regex");
        assert_eq!(sources[0].title, "regex - Rust");
        assert_eq!(sources[1].title, "");
    }

    #[test]
    fn extract_sources_deduplicates_by_uri() {
        let msg = json!({
            "annotations": [
                {"url_citation": {"url": "https://example.com", "title": "a"}},
                {"url_citation": {"url": "https://example.com", "title": "b"}}
            ]
        });
        assert_eq!(extract_sources(&msg).len(), 1);
    }

    #[test]
    fn extract_sources_absent() {
        assert!(extract_sources(&json!({"role": "assistant"})).is_empty());
    }

    #[test]
    fn map_api_error_distinguishes_auth() {
        let err = map_api_error("HTTP 401 Unauthorized");
        assert!(matches!(err, SessionError::Auth(_)));
    }

    #[test]
    fn map_api_error_extracts_api_message() {
        let err = map_api_error(r#"{"error":{"message":"Rate limit exceeded","code":429}}"#);
        match err {
            SessionError::Api(msg) => assert_eq!(msg, "Rate limit exceeded"),
            other => panic!("expected Api, got {:?}", other),
        }
    }

    #[test]
    fn map_api_error_falls_back_to_transport() {
        let err = map_api_error("connection reset by peer");
        assert!(matches!(err, SessionError::Transport(_)));
    }
}
