use vibe_lib::llm::{LLMChat, Message, Role};
use vibe_lib::tools::ToolChoice;
use crate::error::AppError;
use crate::term::Console;
use super::{first_text, Session};

const NO_RESPONSE: &str = "I don't have a response for that.";

/// Basic chat; every turn starts from the system prompt unless history is kept.
pub struct Chat {
    chat: Box<dyn LLMChat>,
    keep_history: bool,
}

impl Chat {
    /// Create an instance.
    pub fn new(chat: Box<dyn LLMChat>, keep_history: bool) -> Self {
        Chat { chat, keep_history }
    }
}

impl Session for Chat {
    fn title(&self) -> &'static str {
        "You can now start chatting with the AI."
    }

    fn intro(&self) -> Vec<String> {
        if self.keep_history {
            vec!["The conversation is kept between turns.".to_owned()]
        } else {
            vec![]
        }
    }

    fn help(&self) -> &'static str {
        "Type a message and press Enter to get a reply from the model.\n\
Without --keep-history every message is answered on its own.\n\
A failed request is reported and the chat goes on; type 'exit' to leave."
    }

    fn handle(&mut self, input: &str, console: &mut dyn Console) -> Result<(), AppError> {
        if !self.keep_history {
            self.chat.clear_history();
        }

        let response = self.chat.get_inference(&[Message::text(Role::User, input.to_owned())], ToolChoice::None)?;
        console.assistant(first_text(&response).unwrap_or(NO_RESPONSE));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::templates::fakes::ScriptedChat;
    use crate::term::Transcript;
    use super::*;

    #[test]
    fn test_stateless_turns() {
        let (chat, seen) = ScriptedChat::new(vec![
            Ok(vec![Message::text(Role::Model, "Hi!".into())]),
            Ok(vec![]),
        ]);
        let mut session = Chat::new(Box::new(chat), false);
        let mut console = Transcript::default();

        session.handle("hello", &mut console).unwrap();
        session.handle("anything else?", &mut console).unwrap();

        assert_eq!(console.lines, vec!["AI: Hi!", "AI: I don't have a response for that."]);
        let seen = seen.borrow();
        assert_eq!(seen.clears, 2);
        assert_eq!(seen.calls[1].0.len(), 1);
        assert_eq!(seen.calls[1].0[0].as_text(), Some("anything else?"));
        assert_eq!(seen.calls[1].1, ToolChoice::None);
    }

    #[test]
    fn test_continues_after_error() {
        let (chat, _) = ScriptedChat::new(vec![
            Err(vibe_lib::Error::LLMErrorMessage("429: rate limited".into())),
            Ok(vec![Message::text(Role::Model, "back".into())]),
        ]);
        let mut session = Chat::new(Box::new(chat), false);
        let mut console = Transcript::default();

        assert!(session.help().contains("the chat goes on"));
        assert!(session.handle("one", &mut console).is_err());
        session.handle("two", &mut console).unwrap();
        assert_eq!(console.lines, vec!["AI: back"]);
    }

    #[test]
    fn test_keep_history() {
        let (chat, seen) = ScriptedChat::new(vec![
            Ok(vec![Message::text(Role::Model, "one".into())]),
            Ok(vec![Message::text(Role::Model, "two".into())]),
        ]);
        let mut session = Chat::new(Box::new(chat), true);
        let mut console = Transcript::default();

        session.handle("a", &mut console).unwrap();
        session.handle("b", &mut console).unwrap();

        assert_eq!(seen.borrow().clears, 0);
        assert_eq!(console.text(), "AI: one\nAI: two");
    }
}
