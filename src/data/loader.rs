use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::models::{AnswerSet, Question, Quiz, QuizError};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid quiz in {}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: QuizError,
    },

    #[error("failed to encode answers for {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Loads and validates a question list from a JSON array.
pub fn load_quiz<P: AsRef<Path>>(path: P) -> Result<Quiz, LoadError> {
    let path = path.as_ref();
    let questions: Vec<Question> = read_json(path)?;
    let quiz = Quiz::new(questions).map_err(|source| LoadError::Invalid {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), questions = quiz.total(), kind = ?quiz.kind(), "loaded quiz");
    Ok(quiz)
}

/// Loads persisted answers; a missing file means there is nothing to resume.
pub fn load_answers<P: AsRef<Path>>(path: P) -> Result<Option<AnswerSet>, LoadError> {
    let path = path.as_ref();
    if !path.exists() {
        debug!(path = %path.display(), "no saved answers");
        return Ok(None);
    }
    let answers: AnswerSet = read_json(path)?;
    info!(path = %path.display(), answered = answers.len(), "loaded saved answers");
    Ok(Some(answers))
}

pub fn save_answers<P: AsRef<Path>>(path: P, answers: &AnswerSet) -> Result<(), LoadError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(answers).map_err(|source| LoadError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| LoadError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), answered = answers.len(), "saved answers");
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
