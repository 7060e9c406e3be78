//! Conversation-to-prompt rendering.
//!
//! The model behind vela is driven by a plain-text transcript rather than a
//! chat template: every user / assistant turn becomes one labelled line and
//! the prompt ends with a bare assistant label so the model continues as the
//! assistant.

use strum::{AsRefStr, Display, EnumString};

/// Default label for user turns (includes its separator).
pub const DEFAULT_USER_LABEL: &str = "用户：";
/// Default label for assistant turns (includes its separator).
pub const DEFAULT_ASSISTANT_LABEL: &str = "助手：";

/// Conversation roles known to the renderer.
///
/// Parsing is exact and case-sensitive (`"user"`, not `"User"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn of a conversation, as received from the caller.
///
/// `role` stays a raw string: roles the renderer does not handle are skipped,
/// not rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// The pair of natural-language role markers written into the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleLabels {
    pub user: String,
    pub assistant: String,
}

impl RoleLabels {
    pub fn new(user: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            assistant: assistant.into(),
        }
    }
}

impl Default for RoleLabels {
    fn default() -> Self {
        Self::new(DEFAULT_USER_LABEL, DEFAULT_ASSISTANT_LABEL)
    }
}

/// Flattens an ordered conversation into a single prompt string.
#[derive(Debug, Clone, Default)]
pub struct PromptRenderer {
    labels: RoleLabels,
}

impl PromptRenderer {
    pub fn new(labels: RoleLabels) -> Self {
        Self { labels }
    }

    pub fn labels(&self) -> &RoleLabels {
        &self.labels
    }

    /// Render `messages` in order as `{label}{trimmed content}\n` lines,
    /// followed by the bare assistant label (no trailing newline).
    ///
    /// Only `user` and `assistant` turns are rendered; `system` and any
    /// other role contribute nothing.
    pub fn render(&self, messages: &[ChatMessage]) -> String {
        let mut prompt = String::new();
        for msg in messages {
            let label = match msg.role.parse::<Role>() {
                Ok(Role::User) => &self.labels.user,
                Ok(Role::Assistant) => &self.labels.assistant,
                Ok(Role::System) | Err(_) => continue,
            };
            prompt.push_str(label);
            prompt.push_str(msg.content.trim());
            prompt.push('\n');
        }
        prompt.push_str(&self.labels.assistant);
        prompt
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
