use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::app::App;
use crate::engine::{CategoryReport, Grade, Outcome, QuizEngine, ScoreReport};

const QUESTION_PREVIEW_LENGTH: usize = 55;

pub fn render(frame: &mut Frame, area: Rect, app: &App, engine: &QuizEngine) {
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(6),
        Constraint::Fill(1),
        Constraint::Length(2),
    ])
    .margin(1)
    .split(area);

    match engine.outcome() {
        Some(Outcome::Scored(report)) => {
            render_score_summary(frame, chunks[1], &report);
            render_question_breakdown(frame, chunks[2], &report, app.result_scroll());
        }
        Some(Outcome::Categorized(report)) => {
            render_survey_summary(frame, chunks[1], engine.answered_count());
            render_category_groups(frame, chunks[2], &report, app.result_scroll());
        }
        None => {}
    }
    render_controls(frame, chunks[3]);
}

fn grade_color(grade: Grade) -> Color {
    match grade {
        Grade::Excellent => Color::Green,
        Grade::Good => Color::Cyan,
        Grade::Fair => Color::Yellow,
        Grade::Poor => Color::Red,
    }
}

fn render_score_summary(frame: &mut Frame, area: Rect, report: &ScoreReport) {
    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "RESULTS",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "{} / {}  ({:.0}%)",
                report.correct,
                report.total,
                report.percentage()
            ),
            Style::default().fg(grade_color(report.grade())).bold(),
        )),
        Line::from(""),
    ];
    render_summary_block(frame, area, content);
}

fn render_survey_summary(frame: &mut Frame, area: Rect, answered: usize) {
    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "ASSESSMENT COMPLETE",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(format!("{} answers recorded", answered).fg(Color::Gray)),
        Line::from(""),
    ];
    render_summary_block(frame, area, content);
}

fn render_summary_block(frame: &mut Frame, area: Rect, content: Vec<Line>) {
    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, area);
}

fn render_question_breakdown(frame: &mut Frame, area: Rect, report: &ScoreReport, scroll: usize) {
    let lines: Vec<Line> = report
        .breakdown
        .iter()
        .enumerate()
        .map(|(index, review)| {
            let (symbol, color) = if review.is_correct {
                ("+", Color::Green)
            } else {
                ("-", Color::Red)
            };

            let mut spans = vec![
                Span::styled(format!(" {} ", symbol), Style::default().fg(color)),
                Span::styled(
                    format!("{:2}. ", index + 1),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    truncate_question(&review.question),
                    Style::default().fg(Color::Gray),
                ),
            ];
            if !review.is_correct {
                spans.push(Span::styled(
                    format!("  ({})", review.correct_answer),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            Line::from(spans)
        })
        .collect();

    render_scrolled(frame, area, lines, scroll);
}

fn render_category_groups(
    frame: &mut Frame,
    area: Rect,
    report: &CategoryReport,
    scroll: usize,
) {
    let mut lines: Vec<Line> = Vec::new();
    for group in &report.groups {
        lines.push(Line::from(Span::styled(
            group.category.as_str(),
            Style::default().fg(Color::Cyan).bold(),
        )));
        for entry in &group.answers {
            lines.push(Line::from(vec![
                Span::styled("   ", Style::default()),
                Span::styled(
                    truncate_question(&entry.question),
                    Style::default().fg(Color::Gray),
                ),
                Span::styled(
                    format!("  {}", entry.answer.as_deref().unwrap_or("No answer")),
                    Style::default().fg(Color::Green),
                ),
            ]));
        }
        lines.push(Line::from(""));
    }

    render_scrolled(frame, area, lines, scroll);
}

fn render_scrolled(frame: &mut Frame, area: Rect, lines: Vec<Line>, scroll: usize) {
    let offset = u16::try_from(scroll).unwrap_or(u16::MAX);
    let widget = Paragraph::new(lines)
        .block(Block::default().padding(Padding::horizontal(1)))
        .scroll((offset, 0));
    frame.render_widget(widget, area);
}

fn truncate_question(text: &str) -> String {
    let char_count = text.chars().count();
    if char_count > QUESTION_PREVIEW_LENGTH {
        let truncated: String = text.chars().take(QUESTION_PREVIEW_LENGTH).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new("j/k scroll  ·  r restart  ·  q quit")
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}
