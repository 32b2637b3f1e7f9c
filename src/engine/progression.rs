//! Quiz progression state machine.
//!
//! The engine is synchronous and never performs I/O. The debounced
//! auto-advance is split in two: [`QuizEngine::select_answer`] records the
//! answer right away and hands out an [`AdvanceTicket`], and
//! [`QuizEngine::apply_advance`] performs the deferred move once the caller's
//! timer fires. Any later selection or accepted navigation supersedes an
//! outstanding ticket, which then applies as [`Advance::Stale`].

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{AnswerSet, Question, Quiz};

use super::outcome::Outcome;

/// Direction of the last step change. Only drives transition animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

/// Visual state of a step indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Current,
    Answered,
    Unanswered,
}

/// Authorises exactly one deferred advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "the advance only happens when the ticket is applied"]
pub struct AdvanceTicket {
    generation: u64,
}

/// Result of applying an [`AdvanceTicket`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Moved forward to the given step.
    Moved { step: usize },
    /// The last question was answered; carries the final answers.
    Completed(AnswerSet),
    /// The ticket was superseded or the quiz had already completed.
    Stale,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EngineError {
    #[error("the quiz is already completed")]
    Completed,

    #[error("an answer cannot be blank")]
    BlankOption,

    #[error("'{option}' is not an option of question '{question_id}'")]
    UnknownOption { question_id: String, option: String },
}

/// Answer state and navigation rules for one quiz session.
#[derive(Debug, Clone)]
pub struct QuizEngine {
    quiz: Quiz,
    answers: AnswerSet,
    current_step: usize,
    direction: Direction,
    completed: bool,
    review_mode: bool,
    generation: u64,
}

impl QuizEngine {
    pub fn new(quiz: Quiz) -> Self {
        Self {
            quiz,
            answers: AnswerSet::new(),
            current_step: 1,
            direction: Direction::Forward,
            completed: false,
            review_mode: false,
            generation: 0,
        }
    }

    /// Replaces the answers with previously persisted ones and jumps to the
    /// frontier.
    ///
    /// Entries for unknown questions, or with options the question does not
    /// offer, are dropped. Resuming never completes the quiz: a fully answered
    /// set lands on the last step.
    pub fn resume_from(&mut self, prior: AnswerSet) {
        if self.completed {
            warn!("ignoring resume on a completed quiz");
            return;
        }

        let mut kept = AnswerSet::new();
        for (question_id, option) in prior.iter() {
            match self.quiz.find(question_id) {
                Some(question) if question.has_option(option) => {
                    kept.record(question_id, option);
                }
                Some(_) => warn!(question_id, option, "dropping resumed answer that is not an option"),
                None => warn!(question_id, "dropping resumed answer for unknown question"),
            }
        }

        self.answers = kept;
        self.generation += 1;
        self.direction = Direction::Forward;
        self.review_mode = false;
        self.current_step = self.next_unanswered();
        info!(
            answered = self.answers.len(),
            step = self.current_step,
            "resumed quiz"
        );
    }

    /// Records `option` for the current question and clears review mode.
    ///
    /// The returned ticket must be applied after the debounce delay to move
    /// on. Selecting again before that supersedes the earlier ticket.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if the quiz is completed, the option is blank, or
    /// the option does not belong to the current question.
    pub fn select_answer(&mut self, option: &str) -> Result<AdvanceTicket, EngineError> {
        if self.completed {
            return Err(EngineError::Completed);
        }
        if option.trim().is_empty() {
            return Err(EngineError::BlankOption);
        }

        let question = self.current_question();
        if !question.has_option(option) {
            return Err(EngineError::UnknownOption {
                question_id: question.id.clone(),
                option: option.to_string(),
            });
        }

        let question_id = question.id.clone();
        let previous = self.answers.record(question_id.as_str(), option);
        self.review_mode = false;
        self.generation += 1;
        debug!(
            question_id = %question_id,
            option,
            overwritten = previous.is_some(),
            step = self.current_step,
            "answer selected"
        );

        Ok(AdvanceTicket {
            generation: self.generation,
        })
    }

    /// Performs the deferred transition authorised by `ticket`.
    pub fn apply_advance(&mut self, ticket: AdvanceTicket) -> Advance {
        if self.completed || ticket.generation != self.generation {
            debug!(step = self.current_step, "discarding stale advance");
            return Advance::Stale;
        }
        self.generation += 1;

        if self.current_step < self.total_steps() {
            self.direction = Direction::Forward;
            self.current_step += 1;
            debug!(step = self.current_step, "advanced");
            Advance::Moved {
                step: self.current_step,
            }
        } else {
            self.completed = true;
            info!(answered = self.answers.len(), "quiz completed");
            Advance::Completed(self.answers.clone())
        }
    }

    /// Supersedes any outstanding ticket without moving.
    pub fn cancel_pending(&mut self) {
        self.generation += 1;
    }

    /// 1-based step of the first unanswered question, or the last step when
    /// everything is answered.
    pub fn next_unanswered(&self) -> usize {
        self.quiz
            .questions()
            .iter()
            .position(|question| !self.answers.contains(&question.id))
            .map_or(self.total_steps(), |index| index + 1)
    }

    pub fn is_step_navigable(&self, step: usize) -> bool {
        step >= 1 && step <= self.next_unanswered()
    }

    /// Moves to `step` if it is not beyond the frontier.
    ///
    /// Rejected navigation leaves every piece of state untouched and returns
    /// `false`. Accepted navigation to another step supersedes any
    /// outstanding ticket; staying on the current step changes nothing.
    pub fn navigate_to(&mut self, step: usize) -> bool {
        if self.completed || !self.is_step_navigable(step) {
            debug!(step, frontier = self.next_unanswered(), "navigation rejected");
            return false;
        }
        if step == self.current_step {
            debug!(step, "already on step");
            return true;
        }

        let frontier = self.next_unanswered();
        self.direction = if step > self.current_step {
            Direction::Forward
        } else {
            Direction::Backward
        };
        self.current_step = step;
        self.generation += 1;

        let answered = self
            .quiz
            .at_step(step)
            .is_some_and(|question| self.answers.contains(&question.id));
        self.review_mode = answered && step != frontier;
        debug!(step, review = self.review_mode, "navigated");
        true
    }

    /// Leaves review mode by jumping back to the frontier.
    pub fn continue_quiz(&mut self) -> bool {
        let accepted = self.navigate_to(self.next_unanswered());
        self.review_mode = false;
        accepted
    }

    pub fn step_state(&self, step: usize) -> StepState {
        if step == self.current_step {
            return StepState::Current;
        }
        match self.quiz.at_step(step) {
            Some(question) if self.answers.contains(&question.id) => StepState::Answered,
            _ => StepState::Unanswered,
        }
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn total_steps(&self) -> usize {
        self.quiz.total()
    }

    pub fn current_question(&self) -> &Question {
        &self.quiz.questions()[self.current_step - 1]
    }

    /// Answer already recorded for the current question, if any.
    pub fn selected_answer(&self) -> Option<&str> {
        self.answers.get(&self.current_question().id)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn is_review_mode(&self) -> bool {
        self.review_mode
    }

    pub fn shows_review_banner(&self) -> bool {
        self.review_mode && !self.completed
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn completion_percentage(&self) -> f64 {
        self.answered_count() as f64 / self.total_steps() as f64 * 100.0
    }

    /// Score report or category grouping, once completed.
    pub fn outcome(&self) -> Option<Outcome> {
        self.completed
            .then(|| Outcome::compute(&self.quiz, &self.answers))
    }
}
