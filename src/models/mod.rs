mod answers;
mod question;

pub use answers::AnswerSet;
pub use question::{Question, Quiz, QuizError, QuizKind, DEFAULT_CATEGORY};

/// Which screen the terminal front-end is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    #[default]
    Welcome,
    Quiz,
    Result,
}
