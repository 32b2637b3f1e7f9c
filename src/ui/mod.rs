mod quiz;
mod result;
mod welcome;

use ratatui::{prelude::*, widgets::Block};

use crate::app::App;
use crate::engine::QuizEngine;
use crate::models::AppState;

pub fn render(frame: &mut Frame, app: &App, engine: &QuizEngine) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    match app.state {
        AppState::Welcome => welcome::render(frame, area, engine),
        AppState::Quiz => quiz::render(frame, area, app, engine),
        AppState::Result => result::render(frame, area, app, engine),
    }
}
