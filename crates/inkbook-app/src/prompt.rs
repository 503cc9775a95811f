//! Blocking user dialogs.

use std::cell::RefCell;
use std::collections::VecDeque;

/// Modal text input and notifications.
///
/// The browser maps these to `window.prompt` and `window.alert`; both block
/// the event loop until dismissed.
pub trait UserPrompt {
    /// Ask for a line of text. `None` if the user cancelled.
    fn prompt_text(&self, message: &str) -> Option<String>;

    /// Show a message.
    fn alert(&self, message: &str);
}

/// A prompt that replays queued answers and records alerts.
///
/// Used by the native binary (which never asks) and by tests.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: RefCell<VecDeque<Option<String>>>,
    alerts: RefCell<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the answer for the next `prompt_text` call.
    pub fn push_answer(&self, answer: Option<&str>) {
        self.answers.borrow_mut().push_back(answer.map(str::to_string));
    }

    /// Alerts shown so far.
    pub fn alerts(&self) -> Vec<String> {
        self.alerts.borrow().clone()
    }
}

impl UserPrompt for ScriptedPrompt {
    fn prompt_text(&self, message: &str) -> Option<String> {
        let answer = self.answers.borrow_mut().pop_front().flatten();
        log::debug!("Prompt {:?} answered with {:?}", message, answer);
        answer
    }

    fn alert(&self, message: &str) {
        log::info!("Alert: {}", message);
        self.alerts.borrow_mut().push(message.to_string());
    }
}
