//! Button rendering utilities

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub struct Button<'a> {
    pub label: &'a str,
    pub shortcut: &'a str,
    pub color: Color,
    pub enabled: bool,
}

impl<'a> Button<'a> {
    pub fn new(label: &'a str, shortcut: &'a str, color: Color) -> Self {
        Self {
            label,
            shortcut,
            color,
            enabled: true,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let style = if self.enabled {
            let fg = if self.color == Color::Yellow {
                Color::Black
            } else {
                Color::White
            };
            Style::default()
                .fg(fg)
                .bg(self.color)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray).bg(Color::Black)
        };

        let text = format!(" [{}] {} ", self.shortcut, self.label);
        let button = Paragraph::new(text)
            .style(style)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));

        f.render_widget(button, area);
    }
}

/// Lay buttons out side by side with `spacing` columns between them, each button's share
/// proportional to `weights`.
pub fn render_button_row(f: &mut Frame, area: Rect, buttons: &[(Button, u16)], spacing: u16) {
    if buttons.is_empty() {
        return;
    }

    let mut constraints = Vec::new();
    for (i, (_, weight)) in buttons.iter().enumerate() {
        constraints.push(Constraint::Fill(*weight));
        if i < buttons.len() - 1 && spacing > 0 {
            constraints.push(Constraint::Length(spacing));
        }
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    let step = if spacing > 0 { 2 } else { 1 };
    for (i, (button, _)) in buttons.iter().enumerate() {
        button.render(f, chunks[i * step]);
    }
}
