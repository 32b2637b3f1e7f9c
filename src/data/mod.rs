mod loader;

pub use loader::{LoadError, load_answers, load_quiz, save_answers};
