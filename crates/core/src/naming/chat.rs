//! OpenAI-compatible chat-completions client used as the naming service.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::NamingConfig;
use crate::naming::{NamingError, NamingService};

const NAMING_TIMEOUT: Duration = Duration::from_secs(60);

/// Fixed system instruction sent with every request.
pub const SYSTEM_INSTRUCTION: &str = "You are a code analysis expert. Analyse the C code and \
produce a fitting function name. Rules:\n\
1. Use English.\n\
2. Use camelCase.\n\
3. The name must reflect the main purpose of the function.\n\
4. Reply with the function name only, without any other text.\n\
5. If the code cannot be analysed, reply None.\n\
6. The name must not exceed 50 characters.";

/// Chat completion request body.
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// One message in a chat request.
#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Naming service backed by a chat-completions endpoint.
pub struct ChatNamingService {
    config: NamingConfig,
    client: Client,
}

impl ChatNamingService {
    pub fn new(config: NamingConfig) -> Result<Self, NamingError> {
        let client = Client::builder()
            .timeout(NAMING_TIMEOUT)
            .build()
            .map_err(|e| NamingError::Transport(e.to_string()))?;
        Ok(Self { config, client })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.api_base.trim_end_matches('/'))
    }

    pub fn build_request(&self, decompiled: &str) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_INSTRUCTION.to_string() },
                ChatMessage {
                    role: "user",
                    content: format!(
                        "Here is decompiled C code. Reply with one suitable function name only:\n\n{decompiled}"
                    ),
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }
}

impl NamingService for ChatNamingService {
    fn suggest(&self, decompiled: &str) -> Result<String, NamingError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&self.build_request(decompiled))
            .send()
            .map_err(|e| NamingError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(NamingError::Api { status: status.as_u16(), body: body.trim().to_string() });
        }

        let parsed: ChatResponse =
            response.json().map_err(|e| NamingError::Transport(e.to_string()))?;
        first_choice_text(parsed)
    }
}

fn first_choice_text(response: ChatResponse) -> Result<String, NamingError> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.unwrap_or_default())
        .ok_or(NamingError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> ChatNamingService {
        ChatNamingService::new(NamingConfig {
            api_base: "https://api.example.test/v1/".into(),
            ..NamingConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn endpoint_appends_chat_path() {
        assert_eq!(service().endpoint(), "https://api.example.test/v1/chat/completions");
    }

    #[test]
    fn request_carries_instruction_and_code() {
        let request = service().build_request("int main(void) { return 0; }");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, "system");
        assert!(request.messages[0].content.contains("camelCase"));
        assert!(request.messages[1].content.ends_with("int main(void) { return 0; }"));
        assert_eq!(request.max_tokens, 50);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][1]["role"], "user");
    }

    #[test]
    fn response_text_is_taken_from_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":" parseConfig "}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(first_choice_text(parsed).unwrap(), " parseConfig ");
    }

    #[test]
    fn response_without_choices_is_an_error() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(first_choice_text(parsed), Err(NamingError::EmptyResponse)));
    }
}
