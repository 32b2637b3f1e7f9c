use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::engine::QuizEngine;
use crate::models::QuizKind;

pub fn render(frame: &mut Frame, area: Rect, engine: &QuizEngine) {
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(10),
        Constraint::Fill(1),
    ])
    .split(area);

    let kind = match engine.quiz().kind() {
        QuizKind::Scored => "Scored",
        QuizKind::Categorized => "Survey",
    };
    let summary = format!("{} Questions · {}", engine.total_steps(), kind);

    let hint = if engine.answered_count() > 0 {
        format!("to resume at question {}", engine.current_step())
    } else {
        "to start".to_string()
    };

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "CALLM",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(summary.fg(Color::DarkGray)),
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "ENTER",
            Style::default().fg(Color::Green).bold(),
        )),
        Line::from(hint.fg(Color::DarkGray)),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray),
    );

    frame.render_widget(widget, chunks[1]);
}
