//! Quiz progression: the synchronous state machine, its completion view, and
//! the async session that owns the debounce timer.

mod outcome;
mod progression;
mod session;

pub use outcome::{
    AnswerReview, CategorizedAnswer, CategoryGroup, CategoryReport, Grade, Outcome, ScoreReport,
};
pub use progression::{Advance, AdvanceTicket, Direction, EngineError, QuizEngine, StepState};
pub use session::{DEFAULT_DEBOUNCE, QuizSession};
