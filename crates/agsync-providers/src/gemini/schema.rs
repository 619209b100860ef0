use serde::Deserialize;
use serde_json::Value;

/// A Gemini CLI chat file: one JSON document per session.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiSession {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub messages: Vec<GeminiMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiMessage {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    /// A plain string in older files, a list of `{text}` parts in newer ones
    #[serde(default)]
    pub content: Value,
    #[serde(default)]
    pub tool_calls: Vec<GeminiToolCall>,
    #[serde(default)]
    pub tokens: Option<GeminiTokens>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiToolCall {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GeminiTokens {
    #[serde(default)]
    pub input: u64,
    #[serde(default)]
    pub output: u64,
    #[serde(default)]
    pub cached: u64,
}

/// Header view used by the probe; message bodies are skipped.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiHeader {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub messages: Vec<GeminiMessageKind>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiMessageKind {
    #[serde(rename = "type", default)]
    pub kind: String,
}
