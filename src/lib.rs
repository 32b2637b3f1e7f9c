//! # callm
//!
//! Quiz progression engine and terminal front-end for the Callm personality
//! assessment.
//!
//! The core is [`engine::QuizEngine`], a synchronous state machine over a
//! validated [`models::Quiz`]. [`engine::QuizSession`] drives it from tokio
//! and owns the debounced auto-advance. [`TerminalQuiz`] puts a session
//! behind a ratatui UI.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use callm::{CallmError, TerminalQuiz};
//! use callm::engine::DEFAULT_DEBOUNCE;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), CallmError> {
//!     let quiz = TerminalQuiz::from_files("questions.json", Some("answers.json"), DEFAULT_DEBOUNCE)?;
//!     quiz.run().await
//! }
//! ```

pub mod analysis;
mod app;
pub mod chat;
pub mod config;
pub mod data;
pub mod engine;
pub mod logging;
pub mod models;
pub mod speech;
pub mod terminal;
mod ui;

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::info;

pub use app::App;
pub use config::Config;
pub use data::LoadError;
pub use models::{AnswerSet, AppState, Question, Quiz};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum CallmError {
    #[error("failed to load quiz data: {0}")]
    Load(#[from] LoadError),

    #[error("terminal error: {0}")]
    Io(#[from] io::Error),
}

/// A quiz session that can be run in the terminal.
pub struct TerminalQuiz {
    app: App,
    completions: mpsc::UnboundedReceiver<AnswerSet>,
}

impl TerminalQuiz {
    /// Starts from `prior` answers when given. Final answers are written to
    /// `answers_path` on completion, and unfinished ones on quit.
    pub fn new(
        quiz: Quiz,
        prior: Option<AnswerSet>,
        debounce: Duration,
        answers_path: Option<PathBuf>,
    ) -> Self {
        let (tx, completions) = mpsc::unbounded_channel();
        Self {
            app: App::new(quiz, prior, debounce, answers_path, tx),
            completions,
        }
    }

    /// Loads the questions and, if the answers file exists, resumes from it.
    pub fn from_files<P: AsRef<Path>, A: AsRef<Path>>(
        questions: P,
        answers: Option<A>,
        debounce: Duration,
    ) -> Result<Self, CallmError> {
        let quiz = data::load_quiz(questions)?;
        let answers_path = answers.map(|path| path.as_ref().to_path_buf());
        let prior = match &answers_path {
            Some(path) => data::load_answers(path)?,
            None => None,
        };
        Ok(Self::new(quiz, prior, debounce, answers_path))
    }

    pub fn from_config(config: &Config) -> Result<Self, CallmError> {
        Self::from_files(
            &config.questions_path,
            config.answers_path.as_ref(),
            config.debounce,
        )
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    /// Takes over the terminal until the user quits.
    pub async fn run(mut self) -> Result<(), CallmError> {
        let mut terminal = terminal::TerminalGuard::enter()?;
        run_event_loop(&mut terminal, &mut self.app, &mut self.completions).await
    }
}

async fn run_event_loop(
    terminal: &mut terminal::AppTerminal,
    app: &mut App,
    completions: &mut mpsc::UnboundedReceiver<AnswerSet>,
) -> Result<(), CallmError> {
    loop {
        if app.should_quit {
            break;
        }

        while let Ok(answers) = completions.try_recv() {
            if let Some(path) = app.answers_path() {
                data::save_answers(path, &answers)?;
            }
            app.show_results();
        }

        app.sync_cursor().await;
        {
            let app = &*app;
            app.session()
                .read(|engine| {
                    terminal
                        .draw(|frame| ui::render(frame, app, engine))
                        .map(|_| ())
                })
                .await?;
        }

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                handle_input(app, key.code).await?;
            }
        }
    }

    if let (Some(path), Some(answers)) = (app.answers_path(), app.unfinished_answers().await) {
        data::save_answers(path, &answers)?;
        info!(answered = answers.len(), "saved progress for resuming");
    }
    Ok(())
}

async fn handle_input(app: &mut App, key: KeyCode) -> Result<(), CallmError> {
    app.clear_status();
    match app.state {
        AppState::Welcome => handle_welcome_input(app, key).await,
        AppState::Quiz => handle_quiz_input(app, key).await,
        AppState::Result => handle_result_input(app, key).await?,
    }
    Ok(())
}

async fn handle_welcome_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Enter => app.start_quiz(),
        KeyCode::Char('q') | KeyCode::Char('Q') => app.quit().await,
        _ => {}
    }
}

async fn handle_quiz_input(app: &mut App, key: KeyCode) {
    app.sync_cursor().await;
    match key {
        KeyCode::Up | KeyCode::Char('k') => app.select_previous_option().await,
        KeyCode::Down | KeyCode::Char('j') => app.select_next_option().await,
        KeyCode::Enter | KeyCode::Char(' ') => app.submit_answer().await,
        KeyCode::Left | KeyCode::Char('h') => app.previous_step().await,
        KeyCode::Right | KeyCode::Char('l') => app.next_step().await,
        KeyCode::Char('c') | KeyCode::Char('C') => app.continue_quiz().await,
        KeyCode::Char(digit @ '1'..='9') => {
            if let Some(step) = digit.to_digit(10) {
                app.navigate_to(step as usize).await;
            }
        }
        KeyCode::Char('q') | KeyCode::Char('Q') => app.quit().await,
        _ => {}
    }
}

async fn handle_result_input(app: &mut App, key: KeyCode) -> Result<(), LoadError> {
    match key {
        KeyCode::Down | KeyCode::Char('j') => app.scroll_results_down(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_results_up(),
        KeyCode::Char('r') | KeyCode::Char('R') => app.restart().await?,
        KeyCode::Char('q') | KeyCode::Char('Q') => app.quit().await,
        _ => {}
    }
    Ok(())
}
