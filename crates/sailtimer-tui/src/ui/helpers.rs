use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
};

pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}

pub fn badge_style(active: bool) -> Style {
    if active {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect() {
        let area = Rect::new(10, 5, 40, 20);
        assert_eq!(centered_rect(area, 20, 10), Rect::new(20, 10, 20, 10));
    }

    #[test]
    fn test_centered_rect_clamps() {
        let area = Rect::new(0, 0, 10, 4);
        assert_eq!(centered_rect(area, 30, 8), area);
    }
}
