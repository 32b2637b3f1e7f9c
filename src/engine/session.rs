//! Async driver for a [`QuizEngine`].
//!
//! Owns the debounce timer between an answer and the automatic advance. The
//! pending advance is cancelled by an accepted navigation, replaced by a new
//! selection, and discarded when the session is closed or dropped.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::models::AnswerSet;

use super::progression::{Advance, AdvanceTicket, EngineError, QuizEngine};

/// Delay between selecting an answer and moving on.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(600);

type CompletionCallback = Box<dyn FnOnce(AnswerSet) + Send>;

struct SessionState {
    engine: QuizEngine,
    pending: Option<JoinHandle<()>>,
    on_complete: Option<CompletionCallback>,
}

impl SessionState {
    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
            debug!("pending advance cancelled");
        }
    }
}

/// A running quiz session. Must be used from within a tokio runtime.
pub struct QuizSession {
    shared: Arc<Mutex<SessionState>>,
    debounce: Duration,
}

impl QuizSession {
    /// Wraps `engine`; `on_complete` is invoked once with the final answers.
    pub fn new(
        engine: QuizEngine,
        debounce: Duration,
        on_complete: impl FnOnce(AnswerSet) + Send + 'static,
    ) -> Self {
        Self {
            shared: Arc::new(Mutex::new(SessionState {
                engine,
                pending: None,
                on_complete: Some(Box::new(on_complete)),
            })),
            debounce,
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Runs `f` against the current engine state.
    pub async fn read<R>(&self, f: impl FnOnce(&QuizEngine) -> R) -> R {
        let state = self.shared.lock().await;
        f(&state.engine)
    }

    pub async fn resume_from(&self, prior: AnswerSet) {
        let mut state = self.shared.lock().await;
        state.cancel_pending();
        state.engine.resume_from(prior);
    }

    /// Records the answer now and schedules the advance after the debounce.
    ///
    /// # Errors
    ///
    /// Propagates `EngineError` from [`QuizEngine::select_answer`]; nothing is
    /// scheduled in that case.
    pub async fn select_answer(&self, option: &str) -> Result<(), EngineError> {
        let mut state = self.shared.lock().await;
        let ticket = state.engine.select_answer(option)?;
        state.cancel_pending();
        state.pending = Some(tokio::spawn(advance_after(
            Arc::downgrade(&self.shared),
            ticket,
            self.debounce,
        )));
        Ok(())
    }

    /// Navigates to `step`; moving to another step cancels the pending
    /// advance.
    pub async fn navigate_to(&self, step: usize) -> bool {
        let mut state = self.shared.lock().await;
        let from = state.engine.current_step();
        let accepted = state.engine.navigate_to(step);
        if accepted && state.engine.current_step() != from {
            state.cancel_pending();
        }
        accepted
    }

    /// Returns to the frontier, leaving review mode.
    pub async fn continue_quiz(&self) -> bool {
        let mut state = self.shared.lock().await;
        let from = state.engine.current_step();
        let accepted = state.engine.continue_quiz();
        if accepted && state.engine.current_step() != from {
            state.cancel_pending();
        }
        accepted
    }

    /// Tears the session down; a pending advance is discarded.
    pub async fn close(&self) {
        let mut state = self.shared.lock().await;
        state.cancel_pending();
        state.engine.cancel_pending();
    }
}

impl Drop for QuizSession {
    fn drop(&mut self) {
        // Tasks only hold a weak reference, so a late timer finds nothing
        // to upgrade even if the lock is busy here.
        if let Ok(mut state) = self.shared.try_lock() {
            state.cancel_pending();
            state.engine.cancel_pending();
        }
    }
}

async fn advance_after(shared: Weak<Mutex<SessionState>>, ticket: AdvanceTicket, delay: Duration) {
    tokio::time::sleep(delay).await;

    let Some(shared) = shared.upgrade() else {
        debug!("session gone before advance");
        return;
    };

    let completion = {
        let mut state = shared.lock().await;
        match state.engine.apply_advance(ticket) {
            Advance::Moved { .. } => {
                state.pending = None;
                None
            }
            Advance::Completed(answers) => {
                state.pending = None;
                state.on_complete.take().map(|callback| (callback, answers))
            }
            Advance::Stale => None,
        }
    };

    if let Some((callback, answers)) = completion {
        info!(answered = answers.len(), "delivering completion");
        callback(answers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Question, Quiz};
    use tokio::sync::mpsc;

    const DEBOUNCE: Duration = Duration::from_millis(600);

    fn engine(ids: &[&str]) -> QuizEngine {
        let questions = ids
            .iter()
            .map(|id| Question {
                id: id.to_string(),
                question: format!("Question {}", id),
                options: vec!["A".into(), "B".into(), "C".into()],
                correct_answer: None,
                category: None,
            })
            .collect();
        QuizEngine::new(Quiz::new(questions).unwrap())
    }

    fn session(ids: &[&str]) -> (QuizSession, mpsc::UnboundedReceiver<AnswerSet>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = QuizSession::new(engine(ids), DEBOUNCE, move |answers| {
            let _ = tx.send(answers);
        });
        (session, rx)
    }

    async fn settle(duration: Duration) {
        tokio::time::sleep(duration).await;
        tokio::task::yield_now().await;
    }

    #[tokio::test(start_paused = true)]
    async fn advance_waits_for_debounce() {
        let (session, _rx) = session(&["Q1", "Q2"]);
        session.select_answer("A").await.unwrap();

        settle(Duration::from_millis(300)).await;
        assert_eq!(session.read(|e| e.current_step()).await, 1);
        assert_eq!(session.read(|e| e.answers().get("Q1").map(String::from)).await.as_deref(), Some("A"));

        settle(Duration::from_millis(400)).await;
        assert_eq!(session.read(|e| e.current_step()).await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn completion_fires_once_with_final_answers() {
        let (session, mut rx) = session(&["Q1", "Q2"]);
        session.select_answer("A").await.unwrap();
        settle(DEBOUNCE * 2).await;
        session.select_answer("B").await.unwrap();
        settle(DEBOUNCE * 2).await;

        let answers = rx.try_recv().expect("completion delivered");
        assert_eq!(answers.get("Q1"), Some("A"));
        assert_eq!(answers.get("Q2"), Some("B"));
        assert!(session.read(|e| e.is_completed()).await);

        assert_eq!(session.select_answer("C").await, Err(EngineError::Completed));
        settle(DEBOUNCE * 2).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn navigation_cancels_pending_advance() {
        let (session, _rx) = session(&["Q1", "Q2", "Q3"]);
        session.select_answer("A").await.unwrap();
        settle(DEBOUNCE * 2).await;

        session.select_answer("B").await.unwrap();
        assert!(session.navigate_to(1).await);
        settle(DEBOUNCE * 2).await;

        assert_eq!(session.read(|e| e.current_step()).await, 1);
        assert!(session.read(|e| e.is_review_mode()).await);
    }

    #[tokio::test(start_paused = true)]
    async fn staying_on_last_step_still_completes() {
        let (session, mut rx) = session(&["Q1", "Q2"]);
        session.select_answer("A").await.unwrap();
        settle(DEBOUNCE * 2).await;

        session.select_answer("A").await.unwrap();
        assert!(session.continue_quiz().await);
        assert!(session.navigate_to(2).await);
        settle(Duration::from_secs(2)).await;

        assert!(session.read(|e| e.is_completed()).await);
        assert_eq!(rx.try_recv().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_reselection_advances_once() {
        let (session, _rx) = session(&["Q1", "Q2", "Q3"]);
        session.select_answer("A").await.unwrap();
        settle(Duration::from_millis(100)).await;
        session.select_answer("B").await.unwrap();
        settle(DEBOUNCE * 2).await;

        assert_eq!(session.read(|e| e.current_step()).await, 2);
        assert_eq!(session.read(|e| e.answers().len()).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn close_discards_pending_completion() {
        let (session, mut rx) = session(&["Q1"]);
        session.select_answer("A").await.unwrap();
        session.close().await;
        settle(DEBOUNCE * 2).await;

        assert!(rx.try_recv().is_err());
        assert!(!session.read(|e| e.is_completed()).await);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_marks_outstanding_ticket_stale() {
        let (session, _rx) = session(&["Q1"]);
        let shared = Arc::clone(&session.shared);
        let ticket = shared.lock().await.engine.select_answer("A").unwrap();

        drop(session);
        assert_eq!(shared.lock().await.engine.apply_advance(ticket), Advance::Stale);
        assert!(!shared.lock().await.engine.is_completed());
    }

    #[tokio::test(start_paused = true)]
    async fn drop_discards_pending_completion() {
        let (session, mut rx) = session(&["Q1"]);
        session.select_answer("A").await.unwrap();
        drop(session);
        settle(DEBOUNCE * 2).await;

        assert!(rx.try_recv().is_err());
    }
}
