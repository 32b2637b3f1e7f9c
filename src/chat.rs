//! Chat transcript shared by the text and voice companions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Ordered message list sent to the completion API.
///
/// Streamed replies are built with [`Conversation::begin_assistant`] followed
/// by [`Conversation::append_token`] as tokens arrive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a conversation whose first message is the given system prompt.
    pub fn with_system(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::new(Role::System, prompt)],
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::new(Role::User, content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::new(Role::Assistant, content));
    }

    pub fn begin_assistant(&mut self) {
        self.push_assistant(String::new());
    }

    /// Appends a streamed token to the reply in progress.
    pub fn append_token(&mut self, token: &str) {
        match self.messages.last_mut() {
            Some(message) if message.role == Role::Assistant => message.content.push_str(token),
            _ => self.push_assistant(token),
        }
    }

    pub fn last_assistant(&self) -> Option<&ChatMessage> {
        self.messages
            .iter()
            .rev()
            .find(|message| message.role == Role::Assistant)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// System prompt for the healing companion, grounded on the user's analysis.
pub fn companion_system_prompt(analysis: &str) -> String {
    format!(
        "You are a kind, empathetic, and emotionally intelligent healing companion.\n\
         \n\
         Here is the user's recent emotional personality analysis:\n\
         {analysis}\n\
         \n\
         Use this insight to guide your tone, responses, and suggestions. Your goal is to \
         provide emotional support, encouragement, and personalized self-care advice based \
         on their traits and struggles.\n\
         \n\
         Always be positive, non-judgmental, and thoughtful. Avoid sounding robotic or \
         clinical. Keep your tone human, gentle, and reassuring.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_accumulate_into_one_reply() {
        let mut conversation = Conversation::with_system("be kind");
        conversation.push_user("hello");
        conversation.begin_assistant();
        for token in ["Hi", " there", "!"] {
            conversation.append_token(token);
        }

        assert_eq!(conversation.len(), 3);
        assert_eq!(
            conversation.last_assistant().map(|m| m.content.as_str()),
            Some("Hi there!")
        );
    }

    #[test]
    fn token_without_open_reply_starts_one() {
        let mut conversation = Conversation::new();
        conversation.push_user("hello");
        conversation.append_token("Hey");
        assert_eq!(conversation.messages()[1].role, Role::Assistant);
    }

    #[test]
    fn serializes_as_message_array() {
        let mut conversation = Conversation::new();
        conversation.push_user("hi");
        let json = serde_json::to_string(&conversation).unwrap();
        assert_eq!(json, r#"[{"role":"user","content":"hi"}]"#);
    }

    #[test]
    fn system_prompt_embeds_analysis() {
        let prompt = companion_system_prompt(r#"{"rating": 7}"#);
        assert!(prompt.starts_with("You are a kind"));
        assert!(prompt.contains("analysis:\n{\"rating\": 7}\n"));
    }
}
