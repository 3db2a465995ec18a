//! Prompt construction
//!
//! A prompt is a fixed system instruction followed by the caller's messages.
//! Message contents may reference the `{input}` variable, which is filled in
//! with the designated input when the prompt is rendered. Any other braces are
//! passed through untouched.

use super::chat::ChatMessage;

pub const SYSTEM_INSTRUCTION: &str = "You are a helpful assistant";

const INPUT_PLACEHOLDER: &str = "{input}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    messages: Vec<ChatMessage>,
}

impl PromptTemplate {
    /// Default system instruction followed by `history` in order.
    pub fn for_conversation(history: &[ChatMessage]) -> Self {
        Self::with_system(SYSTEM_INSTRUCTION, history)
    }

    pub fn with_system(system: &str, history: &[ChatMessage]) -> Self {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(system));
        messages.extend_from_slice(history);
        Self { messages }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn render(&self, input: &str) -> Vec<ChatMessage> {
        self.messages
            .iter()
            .map(|m| ChatMessage::new(m.role, m.content.replace(INPUT_PLACEHOLDER, input)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chat::Role;

    #[test]
    fn test_system_instruction_comes_first() {
        let history = vec![ChatMessage::user("Hi"), ChatMessage::assistant("Hello")];
        let prompt = PromptTemplate::for_conversation(&history);

        let roles: Vec<Role> = prompt.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);
        assert_eq!(prompt.messages()[0].content, "You are a helpful assistant");
        assert_eq!(&prompt.messages()[1..], history.as_slice());
    }

    #[test]
    fn test_render_fills_input() {
        let prompt = PromptTemplate::for_conversation(&[ChatMessage::user("Answer: {input}")]);
        let rendered = prompt.render("why?");
        assert_eq!(rendered[1].content, "Answer: why?");
    }

    #[test]
    fn test_render_leaves_other_braces() {
        let code = "fn main() { println!(\"{}\", x); }";
        let prompt = PromptTemplate::for_conversation(&[ChatMessage::user(code)]);
        let rendered = prompt.render("ignored");
        assert_eq!(rendered[1].content, code);
    }
}
