use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    // Overall background, used to pick a matching syntax palette
    pub background_color: Color,

    // Code blocks
    pub codeblock_bg: Option<Color>,
    pub codeblock_text_style: Style,
    pub codeblock_header_style: Style,
    pub codeblock_action_style: Style,
    pub codeblock_action_active_style: Style,

    // Suggestion cards
    pub suggestion_style: Style,
    pub suggestion_selected_style: Style,
}

impl Theme {
    pub fn dark_default() -> Self {
        Theme {
            background_color: Color::Black,
            codeblock_bg: Some(Color::Rgb(0, 0, 0)),
            codeblock_text_style: Style::default().fg(Color::Rgb(204, 204, 204)),
            codeblock_header_style: Style::default()
                .fg(Color::Rgb(229, 231, 235))
                .bg(Color::Rgb(55, 65, 81)),
            codeblock_action_style: Style::default()
                .fg(Color::Rgb(229, 231, 235))
                .bg(Color::Rgb(55, 65, 81)),
            codeblock_action_active_style: Style::default()
                .fg(Color::Rgb(134, 239, 172))
                .bg(Color::Rgb(55, 65, 81))
                .add_modifier(Modifier::BOLD),
            suggestion_style: Style::default()
                .fg(Color::Rgb(229, 231, 235))
                .bg(Color::Rgb(31, 41, 55)),
            suggestion_selected_style: Style::default()
                .fg(Color::White)
                .bg(Color::Rgb(55, 65, 81))
                .add_modifier(Modifier::BOLD),
        }
    }

    pub fn light() -> Self {
        Theme {
            background_color: Color::White,
            codeblock_bg: Some(Color::Rgb(243, 244, 246)),
            codeblock_text_style: Style::default().fg(Color::Rgb(31, 41, 55)),
            codeblock_header_style: Style::default()
                .fg(Color::Rgb(31, 41, 55))
                .bg(Color::Rgb(209, 213, 219)),
            codeblock_action_style: Style::default()
                .fg(Color::Rgb(31, 41, 55))
                .bg(Color::Rgb(209, 213, 219)),
            codeblock_action_active_style: Style::default()
                .fg(Color::Rgb(21, 128, 61))
                .bg(Color::Rgb(209, 213, 219))
                .add_modifier(Modifier::BOLD),
            suggestion_style: Style::default()
                .fg(Color::Rgb(31, 41, 55))
                .bg(Color::Rgb(243, 244, 246)),
            suggestion_selected_style: Style::default()
                .fg(Color::Black)
                .bg(Color::Rgb(229, 231, 235))
                .add_modifier(Modifier::BOLD),
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "dark" | "default" | "default-dark" => Self::dark_default(),
            "light" => Self::light(),
            // Fallback
            _ => Self::dark_default(),
        }
    }

    pub fn codeblock_body_style(&self) -> Style {
        match self.codeblock_bg {
            Some(bg) => self.codeblock_text_style.bg(bg),
            None => self.codeblock_text_style,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_falls_back_to_dark() {
        assert_eq!(Theme::from_name("LIGHT").background_color, Color::White);
        assert_eq!(Theme::from_name("solarized").background_color, Color::Black);
    }
}
