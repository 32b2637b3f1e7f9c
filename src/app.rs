use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::data::{self, LoadError};
use crate::engine::{QuizEngine, QuizSession};
use crate::models::{AnswerSet, AppState, Quiz};

/// Terminal front-end state around a running [`QuizSession`].
///
/// Completion is reported on the channel passed to [`App::new`]; the event
/// loop moves the app to the results screen when it arrives.
pub struct App {
    pub state: AppState,
    pub should_quit: bool,
    quiz: Quiz,
    answers_path: Option<PathBuf>,
    session: QuizSession,
    debounce: Duration,
    completions: mpsc::UnboundedSender<AnswerSet>,
    cursor: usize,
    cursor_step: usize,
    result_scroll: usize,
    status: Option<String>,
}

impl App {
    pub fn new(
        quiz: Quiz,
        prior: Option<AnswerSet>,
        debounce: Duration,
        answers_path: Option<PathBuf>,
        completions: mpsc::UnboundedSender<AnswerSet>,
    ) -> Self {
        let mut engine = QuizEngine::new(quiz.clone());
        if let Some(prior) = prior {
            engine.resume_from(prior);
        }
        let cursor_step = engine.current_step();
        let cursor = selected_index(&engine);
        let session = start_session(engine, debounce, completions.clone());

        Self {
            state: AppState::Welcome,
            should_quit: false,
            quiz,
            answers_path,
            session,
            debounce,
            completions,
            cursor,
            cursor_step,
            result_scroll: 0,
            status: None,
        }
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    /// File that answers are resumed from and saved to.
    pub fn answers_path(&self) -> Option<&Path> {
        self.answers_path.as_deref()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn result_scroll(&self) -> usize {
        self.result_scroll
    }

    /// Last rejected action, shown in the footer until the next key press.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn start_quiz(&mut self) {
        self.state = AppState::Quiz;
    }

    /// Moves the cursor onto the recorded answer whenever the step changed
    /// underneath it, including after a debounced advance.
    pub async fn sync_cursor(&mut self) {
        let (step, index) = self
            .session
            .read(|engine| (engine.current_step(), selected_index(engine)))
            .await;
        if step != self.cursor_step {
            self.cursor_step = step;
            self.cursor = index;
        }
    }

    pub async fn select_next_option(&mut self) {
        let count = self.option_count().await;
        self.cursor = (self.cursor + 1) % count;
    }

    pub async fn select_previous_option(&mut self) {
        let count = self.option_count().await;
        self.cursor = (self.cursor + count - 1) % count;
    }

    /// Records the option under the cursor. If the step moved since the
    /// cursor was last placed, only the cursor is updated.
    pub async fn submit_answer(&mut self) {
        let cursor = self.cursor;
        let (step, option) = self
            .session
            .read(|engine| {
                (
                    engine.current_step(),
                    engine.current_question().options.get(cursor).cloned(),
                )
            })
            .await;
        if step != self.cursor_step {
            debug!(step, "step changed under the cursor, ignoring submit");
            self.sync_cursor().await;
            return;
        }
        let Some(option) = option else {
            return;
        };
        if let Err(err) = self.session.select_answer(&option).await {
            warn!(error = %err, "answer rejected");
            self.status = Some(err.to_string());
        }
    }

    pub async fn navigate_to(&mut self, step: usize) {
        if !self.session.navigate_to(step).await {
            self.status = Some(format!("Step {} is not available yet", step));
        }
        self.sync_cursor().await;
    }

    pub async fn previous_step(&mut self) {
        let step = self.session.read(|engine| engine.current_step()).await;
        if step > 1 {
            self.navigate_to(step - 1).await;
        }
    }

    pub async fn next_step(&mut self) {
        let step = self.session.read(|engine| engine.current_step()).await;
        self.navigate_to(step + 1).await;
    }

    pub async fn continue_quiz(&mut self) {
        self.session.continue_quiz().await;
        self.sync_cursor().await;
    }

    pub fn show_results(&mut self) {
        self.state = AppState::Result;
        self.result_scroll = 0;
    }

    pub fn scroll_results_down(&mut self) {
        self.result_scroll = self.result_scroll.saturating_add(1);
    }

    pub fn scroll_results_up(&mut self) {
        self.result_scroll = self.result_scroll.saturating_sub(1);
    }

    /// Answers recorded so far, or `None` once the quiz has completed.
    pub async fn unfinished_answers(&self) -> Option<AnswerSet> {
        self.session
            .read(|engine| {
                (!engine.is_completed() && !engine.answers().is_empty())
                    .then(|| engine.answers().clone())
            })
            .await
    }

    /// Starts over with no answers, emptying the answers file if there is one.
    pub async fn restart(&mut self) -> Result<(), LoadError> {
        self.session.close().await;
        if let Some(path) = &self.answers_path {
            data::save_answers(path, &AnswerSet::new())?;
        }
        let engine = QuizEngine::new(self.quiz.clone());
        self.session = start_session(engine, self.debounce, self.completions.clone());
        self.state = AppState::Welcome;
        self.cursor = 0;
        self.cursor_step = 1;
        self.result_scroll = 0;
        self.status = None;
        info!("quiz restarted");
        Ok(())
    }

    pub async fn quit(&mut self) {
        self.session.close().await;
        self.should_quit = true;
    }

    async fn option_count(&self) -> usize {
        self.session
            .read(|engine| engine.current_question().options.len())
            .await
            .max(1)
    }
}

fn start_session(
    engine: QuizEngine,
    debounce: Duration,
    completions: mpsc::UnboundedSender<AnswerSet>,
) -> QuizSession {
    QuizSession::new(engine, debounce, move |answers| {
        let _ = completions.send(answers);
    })
}

fn selected_index(engine: &QuizEngine) -> usize {
    engine
        .selected_answer()
        .and_then(|answer| {
            engine
                .current_question()
                .options
                .iter()
                .position(|option| option == answer)
        })
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Question;

    fn quiz() -> Quiz {
        let questions = ["Q1", "Q2", "Q3"]
            .iter()
            .map(|id| Question {
                id: id.to_string(),
                question: format!("Question {}", id),
                options: vec!["A".into(), "B".into(), "C".into()],
                correct_answer: None,
                category: None,
            })
            .collect();
        Quiz::new(questions).unwrap()
    }

    fn app(prior: Option<AnswerSet>) -> (App, mpsc::UnboundedReceiver<AnswerSet>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (App::new(quiz(), prior, Duration::from_millis(100), None, tx), rx)
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(200)).await;
        tokio::task::yield_now().await;
    }

    #[tokio::test(start_paused = true)]
    async fn cursor_wraps_around_options() {
        let (mut app, _rx) = app(None);
        app.select_previous_option().await;
        assert_eq!(app.cursor(), 2);
        app.select_next_option().await;
        assert_eq!(app.cursor(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cursor_follows_recorded_answer() {
        let prior: AnswerSet = [("Q1", "C")].into_iter().collect();
        let (mut app, _rx) = app(Some(prior));
        assert_eq!(app.cursor(), 0);

        app.navigate_to(1).await;
        assert_eq!(app.cursor(), 2);
        assert!(app.session().read(|e| e.is_review_mode()).await);
    }

    #[tokio::test(start_paused = true)]
    async fn submitting_every_step_completes() {
        let (mut app, mut rx) = app(None);
        app.start_quiz();
        for _ in 0..3 {
            app.select_next_option().await;
            app.submit_answer().await;
            settle().await;
            app.sync_cursor().await;
        }

        let answers = rx.try_recv().unwrap();
        assert_eq!(answers.get("Q3"), Some("B"));
        assert_eq!(app.unfinished_answers().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_jump_sets_status() {
        let (mut app, _rx) = app(None);
        app.navigate_to(3).await;
        assert_eq!(app.status(), Some("Step 3 is not available yet"));
        assert_eq!(app.session().read(|e| e.current_step()).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_clears_answers() {
        let (mut app, _rx) = app(None);
        app.start_quiz();
        app.submit_answer().await;
        assert!(app.unfinished_answers().await.is_some());

        app.restart().await.unwrap();
        assert_eq!(app.state, AppState::Welcome);
        assert_eq!(app.session().read(|e| e.answered_count()).await, 0);
        assert_eq!(app.unfinished_answers().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn submit_after_unseen_advance_only_moves_cursor() {
        let (mut app, _rx) = app(None);
        app.start_quiz();
        app.select_next_option().await;
        app.submit_answer().await;
        settle().await;

        app.submit_answer().await;
        assert_eq!(app.session().read(|e| e.answered_count()).await, 1);
        assert_eq!(app.session().read(|e| e.current_step()).await, 2);
        assert_eq!(app.cursor(), 0);

        app.submit_answer().await;
        assert_eq!(
            app.session().read(|e| e.answers().get("Q2").map(String::from)).await.as_deref(),
            Some("A")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn restart_empties_answers_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.json");
        let prior: AnswerSet = [("Q1", "A"), ("Q2", "B")].into_iter().collect();
        data::save_answers(&path, &prior).unwrap();

        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = App::new(
            quiz(),
            Some(prior),
            Duration::from_millis(100),
            Some(path.clone()),
            tx,
        );
        app.restart().await.unwrap();

        assert_eq!(data::load_answers(&path).unwrap(), Some(AnswerSet::new()));
        assert_eq!(app.unfinished_answers().await, None);
    }
}
