use ratatui::{
    prelude::*,
    widgets::{Paragraph, Wrap},
};

use crate::app::App;
use crate::engine::{Direction, QuizEngine, StepState};

pub fn render(frame: &mut Frame, area: Rect, app: &App, engine: &QuizEngine) {
    let banner_height = if engine.shows_review_banner() { 1 } else { 0 };
    let chunks = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(banner_height),
        Constraint::Length(4),
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .margin(2)
    .split(area);

    render_steps(frame, chunks[0], engine);
    if engine.shows_review_banner() {
        render_review_banner(frame, chunks[1]);
    }
    render_question_text(frame, chunks[2], &engine.current_question().question);
    render_options(frame, chunks[3], app, engine);
    render_progress(frame, chunks[4], app, engine);
    render_controls(frame, chunks[5]);
}

fn render_steps(frame: &mut Frame, area: Rect, engine: &QuizEngine) {
    let spans: Vec<Span> = (1..=engine.total_steps())
        .map(|step| {
            let style = match engine.step_state(step) {
                StepState::Current => Style::default().fg(Color::Cyan).bold(),
                StepState::Answered => Style::default().fg(Color::Green),
                StepState::Unanswered if engine.is_step_navigable(step) => {
                    Style::default().fg(Color::Gray)
                }
                StepState::Unanswered => Style::default().fg(Color::DarkGray),
            };
            Span::styled(format!(" {} ", step), style)
        })
        .collect();

    let widget = Paragraph::new(Line::from(spans)).wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

fn render_review_banner(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new("Reviewing a previous answer  ·  c continue quiz")
        .alignment(Alignment::Center)
        .fg(Color::Yellow);
    frame.render_widget(widget, area);
}

fn render_question_text(frame: &mut Frame, area: Rect, text: &str) {
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .fg(Color::White)
        .bold();
    frame.render_widget(widget, area);
}

fn render_options(frame: &mut Frame, area: Rect, app: &App, engine: &QuizEngine) {
    let options = &engine.current_question().options;
    let recorded = engine.selected_answer();
    let mut lines: Vec<Line> = Vec::with_capacity(options.len() * 2);

    for (index, option) in options.iter().enumerate() {
        let is_cursor = index == app.cursor();
        let is_recorded = recorded == Some(option.as_str());
        let style = match (is_cursor, is_recorded) {
            (true, _) => Style::default().fg(Color::Cyan).bold(),
            (false, true) => Style::default().fg(Color::Green),
            (false, false) => Style::default().fg(Color::Gray),
        };
        let marker = if is_cursor { ">" } else { " " };
        let check = if is_recorded { " ✓" } else { "" };

        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", marker), style),
            Span::styled(format!("{}. ", option_label(index)), style),
            Span::styled(option.as_str(), style),
            Span::styled(check, Style::default().fg(Color::Green)),
        ]));
        lines.push(Line::from(""));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_progress(frame: &mut Frame, area: Rect, app: &App, engine: &QuizEngine) {
    let arrow = match engine.direction() {
        Direction::Forward => "→",
        Direction::Backward => "←",
    };
    let progress = format!(
        "{} Question {} of {}  ·  {:.0}% completed",
        arrow,
        engine.current_step(),
        engine.total_steps(),
        engine.completion_percentage()
    );

    let line = match app.status() {
        Some(status) => Line::from(vec![
            Span::styled(status.to_string(), Style::default().fg(Color::Red)),
            Span::raw("   "),
            Span::styled(progress, Style::default().fg(Color::DarkGray)),
        ]),
        None => Line::from(progress.fg(Color::DarkGray)),
    };
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Right), area);
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new(
        "j/k option  ·  enter select  ·  h/l or 1-9 step  ·  c continue  ·  q quit",
    )
    .alignment(Alignment::Center)
    .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}

fn option_label(index: usize) -> String {
    u8::try_from(index)
        .ok()
        .filter(|offset| *offset < 26)
        .map(|offset| char::from(b'A' + offset).to_string())
        .unwrap_or_else(|| (index + 1).to_string())
}
