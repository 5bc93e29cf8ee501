use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub text: String,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub is_created_by_user: bool,
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub unfinished: bool,
    /// Follow-up prompts offered by providers that support them.
    #[serde(default)]
    pub suggestions: Option<Vec<String>>,
}

impl ChatMessage {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Interpret raw input as either a serialized message object or plain
    /// message text.
    pub fn from_input(raw: &str) -> Self {
        let trimmed = raw.trim_start();
        if trimmed.starts_with('{') {
            if let Ok(message) = serde_json::from_str::<ChatMessage>(raw) {
                return message;
            }
        }
        Self::from_text(raw)
    }

    pub fn suggestions(&self) -> &[String] {
        self.suggestions.as_deref().unwrap_or_default()
    }

    pub fn is_assistant(&self) -> bool {
        !self.is_created_by_user
    }
}
