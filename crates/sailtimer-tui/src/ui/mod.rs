mod big_text;
mod buttons;
mod helpers;

use crate::app::App;
use big_text::BigText;
use buttons::{render_button_row, Button};
use helpers::{badge_style, centered_rect};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use sailtimer_core::format::wall_clock;
use sailtimer_core::models::TimerMode;
use sailtimer_core::Clock;

pub fn draw<C: Clock>(f: &mut Frame, app: &App<C>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(7),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(f.area());

    draw_title_bar(f, app, chunks[0]);
    draw_clock_face(f, app, chunks[1]);
    draw_buttons(f, app, chunks[2]);
    draw_status_bar(f, app, chunks[3]);

    if app.show_help {
        draw_help_modal(f);
    }
}

fn draw_title_bar<C: Clock>(f: &mut Frame, app: &App<C>, area: Rect) {
    let snapshot = &app.snapshot;

    let mut spans = vec![Span::styled(
        "⛵ SailTimer ",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];

    if app.is_running() {
        spans.push(Span::styled(
            format!(" {} ", snapshot.mode.icon()),
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        let now = chrono::Local::now();
        spans.push(Span::raw(format!(" {} ", wall_clock(&now))));
        spans.push(Span::styled(
            format!(" ⏱ {} ", snapshot.duration.label()),
            badge_style(true),
        ));
        spans.push(Span::styled(
            format!(" {} {} ", snapshot.mode.icon(), snapshot.mode.as_str()),
            badge_style(snapshot.mode == TimerMode::CountdownThenRepeat),
        ));
    }

    let lock = if snapshot.locked { " 🔒 " } else { " 🔓 " };
    spans.push(Span::styled(lock, badge_style(snapshot.locked)));

    let title = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(title, area);
}

fn draw_clock_face<C: Clock>(f: &mut Frame, app: &App<C>, area: Rect) {
    let snapshot = &app.snapshot;

    let color = if app.is_running() {
        if snapshot.remaining_seconds <= 10 {
            Color::Red
        } else if snapshot.remaining_seconds <= 60 {
            Color::Yellow
        } else {
            Color::Green
        }
    } else {
        Color::White
    };

    let mut title = format!(" {} ", snapshot.state.as_str());
    if snapshot.mode == TimerMode::CountdownThenRepeat && snapshot.cycles_completed > 0 {
        title = format!(" {} · cycle {} ", snapshot.state.as_str(), snapshot.cycles_completed + 1);
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(color));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let text_width = BigText::width(&snapshot.display);
    if inner.width >= text_width && inner.height >= BigText::height() {
        let target = centered_rect(inner, text_width, BigText::height());
        f.render_widget(
            BigText::new(&snapshot.display).style(Style::default().fg(color)),
            target,
        );
    } else {
        let plain = Paragraph::new(snapshot.display.as_str())
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center);
        f.render_widget(plain, inner);
    }
}

fn draw_buttons<C: Clock>(f: &mut Frame, app: &App<C>, area: Rect) {
    let enabled = !app.snapshot.locked;

    if app.is_running() {
        let buttons = [
            (Button::new("Sync", "s", Color::Magenta).enabled(enabled), 1),
            (Button::new("Stop", "Space", Color::Red).enabled(enabled), 2),
        ];
        render_button_row(f, area, &buttons, 1);
    } else {
        let duration_label = format!("{} min", app.snapshot.duration.label());
        let buttons = [
            (Button::new(&duration_label, "d", Color::Blue).enabled(enabled), 1),
            (Button::new("Mode", "m", Color::Green).enabled(enabled), 1),
            (Button::new("Lock", "l", Color::LightRed), 1),
            (Button::new("Reset", "r", Color::Yellow).enabled(enabled), 1),
            (Button::new("Start", "Space", Color::Green).enabled(enabled), 2),
        ];
        render_button_row(f, area, &buttons, 1);
    }
}

fn draw_status_bar<C: Clock>(f: &mut Frame, app: &App<C>, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", app.status_message),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(" [?]Help [q]Quit ", Style::default().fg(Color::DarkGray)),
    ]);

    let status = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(status, area);
}

fn draw_help_modal(f: &mut Frame) {
    let area = centered_rect(f.area(), 52, 16);
    f.render_widget(Clear, area);

    let key = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let rows = [
        ("Space/Enter", "Start or stop the countdown"),
        ("s", "Sync down to the last whole minute"),
        ("r", "Reset to the full sequence"),
        ("d", "Switch 3 / 5 minute sequence"),
        ("m", "Toggle stop-at-zero / repeat"),
        ("l", "Lock or unlock input"),
        ("?", "Toggle this help"),
        ("q / Esc", "Quit"),
    ];

    let mut lines = vec![Line::from("")];
    for (k, description) in rows {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<12}", k), key),
            Span::raw(description),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Settings only change while the timer is stopped.",
        Style::default().fg(Color::DarkGray),
    )));

    let help = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Help ")
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(help, area);
}
