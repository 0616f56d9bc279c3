use std::cell::RefCell;

/// Capability for surfacing messages and yes/no questions to the user.
/// Injected into decision logic so it stays testable without a real UI; the
/// concrete surface (modal dialog, console line) lives in the rendering
/// layer. Both operations are total: delivery failures are swallowed by the
/// implementation, never reported back to the core.
pub trait UserPrompt {
    /// Deliver a one-way message.
    fn notify(&self, message: &str);

    /// Ask a yes/no question and block until the user answers.
    fn confirm(&self, question: &str) -> bool;
}

/// Scripted prompt for tests: records everything it is asked and answers
/// every confirmation with a fixed response.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answer: bool,
    notifications: RefCell<Vec<String>>,
    questions: RefCell<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            ..Self::default()
        }
    }

    pub fn notifications(&self) -> Vec<String> {
        self.notifications.borrow().clone()
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.borrow().clone()
    }
}

impl UserPrompt for ScriptedPrompt {
    fn notify(&self, message: &str) {
        self.notifications.borrow_mut().push(message.to_string());
    }

    fn confirm(&self, question: &str) -> bool {
        self.questions.borrow_mut().push(question.to_string());
        self.answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_notifications_and_questions() {
        let prompt = ScriptedPrompt::answering(true);
        prompt.notify("session over");
        assert!(prompt.confirm("mark it done?"));

        assert_eq!(prompt.notifications(), vec!["session over"]);
        assert_eq!(prompt.questions(), vec!["mark it done?"]);
    }

    #[test]
    fn default_answer_is_no() {
        let prompt = ScriptedPrompt::default();
        assert!(!prompt.confirm("anything"));
    }
}
