//! Gemini `generateContent` client.
//!
//! Sends the persona instruction, the prior turns and the new user text in
//! one blocking request. Meant to run on a worker thread.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chat::{ChatBackend, ChatMessage, ChatRole};
use crate::error::ChatError;
use crate::options::ChatOptions;

pub const SYSTEM_INSTRUCTION: &str = "\
You are \"Orbital\", a highly advanced AI planetary guide aboard a virtual satellite orbiting Earth.
Your goal is to educate the user about Earth, space, geography, and the cosmos in a concise, poetic, and scientifically accurate way.
Keep your responses relatively short (under 100 words) unless asked for a detailed explanation.
Use a calm, futuristic, and awe-inspiring tone.
If the user asks about specific coordinates or locations, pretend you are scanning the surface.";

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest<'a> {
    system_instruction: Instruction<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Debug)]
struct Instruction<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize, Debug)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Serialize, Debug)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize, Debug)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize, Debug, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
struct CandidatePart {
    text: Option<String>,
}

fn wire_role(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "user",
        ChatRole::Model => "model",
    }
}

pub fn build_request<'a>(history: &'a [ChatMessage], message: &'a str, temperature: f32) -> GenerateRequest<'a> {
    let mut contents: Vec<Content<'a>> = history.iter()
        .map(|m| Content { role: wire_role(m.role), parts: [Part { text: &m.text }] })
        .collect();
    contents.push(Content { role: wire_role(ChatRole::User), parts: [Part { text: message }] });
    GenerateRequest {
        system_instruction: Instruction { parts: [Part { text: SYSTEM_INSTRUCTION }] },
        contents,
        generation_config: GenerationConfig { temperature },
    }
}

/// Concatenated text of the first candidate.
pub fn parse_reply(body: &str) -> Result<String, ChatError> {
    let reply: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| ChatError::Malformed(e.to_string()))?;
    let text: String = reply.candidates.into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.is_empty() {
        Err(ChatError::EmptyResponse)
    } else {
        Ok(text)
    }
}

pub struct GeminiBackend {
    options: ChatOptions,
    agent: ureq::Agent,
}

impl GeminiBackend {
    pub fn new(options: ChatOptions) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(options.timeout_secs))
            .build();
        Self { options, agent }
    }

    fn api_key(&self) -> Result<String, ChatError> {
        match std::env::var(&self.options.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ChatError::MissingApiKey(self.options.api_key_env.clone())),
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.options.endpoint.trim_end_matches('/'),
            self.options.model,
        )
    }
}

impl ChatBackend for GeminiBackend {
    fn send(&self, history: &[ChatMessage], message: &str) -> Result<String, ChatError> {
        let key = self.api_key()?;
        let request = build_request(history, message, self.options.temperature);
        debug!(model = %self.options.model, turns = history.len(), "sending chat request");

        let response = self.agent.post(&self.url())
            .set("x-goog-api-key", &key)
            .send_json(&request)
            .map_err(|e| match e {
                ureq::Error::Status(status, resp) => ChatError::Service {
                    status,
                    body: resp.into_string().unwrap_or_default(),
                },
                ureq::Error::Transport(t) => ChatError::Network(t.to_string()),
            })?;
        let body = response.into_string()
            .map_err(|e| ChatError::Network(e.to_string()))?;
        parse_reply(&body)
    }
}
