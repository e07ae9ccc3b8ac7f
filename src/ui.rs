use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use wordrush::{util, variant::MAX_LIVES, GameKind, Light, Outcome, Phase};

use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
const OPTION_GAP: &str = "    ";

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Playing => render_playing(self, area, buf),
            AppState::GameOver => render_game_over(self, area, buf),
        }
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim_bold() -> Style {
    bold().add_modifier(Modifier::DIM)
}

fn instruction(game: GameKind) -> &'static str {
    match game {
        GameKind::FlyingWords => "catch the synonym of",
        GameKind::GreenLight => "on green, pick the synonym of",
        GameKind::SwipeMatch => "swipe to the antonym of",
    }
}

fn render_playing(app: &App, area: Rect, buf: &mut Buffer) {
    let session = &app.session;
    let round = session.round();

    if session.is_paused() {
        Paragraph::new(Span::styled(
            "PAUSED - press p to continue",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(area, buf);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // status
            Constraint::Length(1), // light / session clock
            Constraint::Min(1),
            Constraint::Length(1), // instruction
            Constraint::Length(1), // prompt
            Constraint::Length(1),
            Constraint::Length(round.options.len() as u16 + 1), // options
            Constraint::Length(1), // feedback
            Constraint::Min(1),
            Constraint::Length(1), // help
        ])
        .split(area);

    let status = Line::from(vec![
        Span::styled(session.rules().kind.to_string(), bold()),
        Span::raw(format!("   score {}   ", session.score())),
        Span::styled(
            util::hearts(session.lives(), MAX_LIVES),
            Style::default().fg(Color::Red),
        ),
        Span::raw(format!(
            "   round {}   {}s",
            session.round_number(),
            round.time_remaining_secs
        )),
        Span::styled(
            if round.is_frozen() { "  frozen" } else { "" },
            Style::default().fg(Color::Cyan),
        ),
    ]);
    Paragraph::new(status)
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let mut clock_spans = Vec::new();
    match session.light() {
        Some(Light::Green) => clock_spans.push(Span::styled(
            "● GREEN",
            bold().fg(Color::Green),
        )),
        Some(Light::Red) => clock_spans.push(Span::styled("● RED", bold().fg(Color::Red))),
        None => {}
    }
    if let Some(secs) = session.session_secs_remaining() {
        clock_spans.push(Span::styled(format!("   {secs}s left"), dim_bold()));
    }
    Paragraph::new(Line::from(clock_spans))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        instruction(session.rules().kind),
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[3], buf);

    Paragraph::new(Span::styled(
        round.prompt.to_uppercase(),
        bold().fg(Color::Magenta),
    ))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);

    render_options(app, chunks[6], buf);

    if let Some(feedback) = &app.feedback {
        let (text, style) = match feedback.outcome {
            Outcome::Correct => (
                format!("correct! +{}", feedback.score_delta),
                bold().fg(Color::Green),
            ),
            Outcome::Incorrect => (
                match &feedback.chosen {
                    Some(chosen) => format!(
                        "\"{chosen}\" is not it, it was \"{}\"",
                        feedback.correct_answer
                    ),
                    None => format!("not quite, it was \"{}\"", feedback.correct_answer),
                },
                bold().fg(Color::Red),
            ),
            Outcome::TimedOut => (
                format!("time's up, it was \"{}\"", feedback.correct_answer),
                bold().fg(Color::Red),
            ),
        };
        Paragraph::new(Span::styled(text, style))
            .alignment(Alignment::Center)
            .render(chunks[7], buf);
    }

    let help = match session.phase() {
        Phase::Feedback { .. } => "enter next round   p pause   esc quit".to_string(),
        _ if session.rules().kind == GameKind::SwipeMatch => {
            "← / → swipe   f freeze   p pause   esc quit".to_string()
        }
        _ => format!(
            "1-{} answer   {}p pause   esc quit",
            round.options.len(),
            if session.freezes_left() > 0 { "f freeze   " } else { "" }
        ),
    };
    Paragraph::new(Span::styled(help, Style::default().add_modifier(Modifier::DIM)))
        .alignment(Alignment::Center)
        .render(chunks[9], buf);
}

fn option_style(app: &App, word: &str) -> Style {
    let round = app.session.round();
    if !round.is_resolved() {
        return bold();
    }
    if round.correct_options.contains(word) {
        bold().fg(Color::Green)
    } else if round.chosen.as_deref() == Some(word) {
        bold().fg(Color::Red).add_modifier(Modifier::CROSSED_OUT)
    } else {
        dim_bold()
    }
}

fn render_options(app: &App, area: Rect, buf: &mut Buffer) {
    let round = app.session.round();
    let labels: Vec<String> = if app.session.rules().kind == GameKind::SwipeMatch {
        round
            .options
            .iter()
            .enumerate()
            .map(|(i, w)| if i == 0 { format!("← {w}") } else { format!("{w} →") })
            .collect()
    } else {
        round
            .options
            .iter()
            .enumerate()
            .map(|(i, w)| format!("[{}] {w}", i + 1))
            .collect()
    };

    let one_line_width: usize = labels.iter().map(|l| l.width()).sum::<usize>()
        + OPTION_GAP.width() * labels.len().saturating_sub(1);

    let spans: Vec<(String, Style)> = labels
        .into_iter()
        .zip(round.options.iter())
        .map(|(label, word)| (label, option_style(app, word)))
        .collect();

    if one_line_width <= area.width as usize {
        let mut line = Vec::new();
        for (i, (label, style)) in spans.into_iter().enumerate() {
            if i > 0 {
                line.push(Span::raw(OPTION_GAP));
            }
            line.push(Span::styled(label, style));
        }
        Paragraph::new(Line::from(line))
            .alignment(Alignment::Center)
            .render(area, buf);
    } else {
        let lines: Vec<Line> = spans
            .into_iter()
            .map(|(label, style)| Line::from(Span::styled(label, style)))
            .collect();
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

fn render_game_over(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(4), // summary
            Constraint::Length(1),
            Constraint::Min(1), // recent games
            Constraint::Length(1), // help
        ])
        .split(area);

    Paragraph::new(Span::styled("GAME OVER", bold().fg(Color::Magenta)))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    if let Some(summary) = app.session.summary() {
        let mut lines = vec![
            Line::from(vec![
                Span::styled(format!("{} ", summary.score), bold().fg(Color::Green)),
                Span::raw("points"),
            ]),
            Line::from(format!(
                "{} of {} rounds right ({}%) on \"{}\"",
                summary.correct_answers,
                summary.rounds_completed,
                summary.accuracy(),
                summary.prompt
            )),
            Line::from(Span::styled(
                summary.end_reason.to_string().replace('_', " "),
                Style::default().add_modifier(Modifier::ITALIC),
            )),
        ];
        if let Some(best) = app.best_score {
            lines.push(Line::from(Span::styled(
                format!("best {}: {best}", summary.game),
                dim_bold(),
            )));
        }
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(chunks[1], buf);
    }

    if app.settings.show_history && !app.recent.is_empty() {
        let lines: Vec<Line> = app
            .recent
            .iter()
            .map(|s| {
                Line::from(Span::styled(
                    format!(
                        "{}  {:<13} {:<10} {:>4}",
                        s.finished_at.format("%m-%d %H:%M"),
                        s.game.to_string(),
                        s.prompt,
                        s.score
                    ),
                    Style::default().add_modifier(Modifier::DIM),
                ))
            })
            .collect();
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(chunks[3], buf);
    }

    Paragraph::new(Span::styled(
        "(r)eplay word / (n)ew game / (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);
}
