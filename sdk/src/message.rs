//! Conversation messages and completion types
//!
//! A task's working memory is an ordered sequence of [`Message`] values:
//! one system prompt, the user goal, then alternating assistant output and
//! tool results. The serialized form (camelCase, explicit `toolCallId`
//! null) is the cache wire format and must stay stable.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System prompt
    System,

    /// User message (the task goal)
    User,

    /// Assistant message (model output)
    Assistant,

    /// Tool result message
    Tool,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
            MessageRole::Tool => write!(f, "tool"),
        }
    }
}

/// Message in a conversation history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Role of the message sender
    pub role: MessageRole,

    /// Content of the message
    pub content: String,

    /// Correlates a tool result with the assistant tool call that requested
    /// it. Required when role is `tool`, null otherwise.
    #[serde(default)]
    pub tool_call_id: Option<String>,
}

impl Message {
    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
            tool_call_id: None,
        }
    }

    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            tool_call_id: None,
        }
    }

    /// Create a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            tool_call_id: None,
        }
    }

    /// Create a new tool result message
    pub fn tool_result(content: impl Into<String>, tool_call_id: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Tool,
            content: content.into(),
            tool_call_id: Some(tool_call_id.into()),
        }
    }
}

/// Tool call requested by the completion provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    /// Correlation token for this call
    pub id: String,

    /// Name of the tool to invoke
    pub name: String,

    /// Opaque serialized arguments (JSON string)
    pub arguments_json: String,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments_json: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments_json: arguments_json.into(),
        }
    }
}

/// One completion provider response: model output plus zero or more
/// requested tool calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResult {
    /// Model output text
    pub content: String,

    /// Tool calls requested by the model, in dispatch order
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

impl CompletionResult {
    /// Create a final answer with no tool calls
    pub fn answer(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Create a response requesting tool calls
    pub fn with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: content.into(),
            tool_calls,
        }
    }

    /// True iff the response requests at least one tool call
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, MessageRole::User);
        assert_eq!(msg.content, "Hello");
        assert_eq!(msg.tool_call_id, None);

        let msg = Message::tool_result("done", "call_1");
        assert_eq!(msg.role, MessageRole::Tool);
        assert_eq!(msg.tool_call_id, Some("call_1".to_string()));
    }

    #[test]
    fn test_message_wire_format() {
        let json = serde_json::to_string(&Message::user("hi")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hi","toolCallId":null}"#);

        let json = serde_json::to_string(&Message::tool_result("ok", "call_9")).unwrap();
        assert!(json.contains(r#""toolCallId":"call_9""#));
    }

    #[test]
    fn test_message_roundtrip() {
        let msg = Message::tool_result("result", "call_42");
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, back);
    }

    #[test]
    fn test_tool_call_wire_format() {
        let call = ToolCall::new("call_1", "file_system", r#"{"path":"a.txt"}"#);
        let json = serde_json::to_string(&call).unwrap();
        assert!(json.contains(r#""argumentsJson""#));
    }

    #[test]
    fn test_has_tool_calls() {
        assert!(!CompletionResult::answer("done").has_tool_calls());

        let result = CompletionResult::with_tool_calls(
            "",
            vec![ToolCall::new("call_1", "web_search", "{}")],
        );
        assert!(result.has_tool_calls());
    }
}
