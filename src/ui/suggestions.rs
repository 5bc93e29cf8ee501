use crate::core::message::ChatMessage;
use crate::ui::theme::Theme;
use ratatui::text::{Line, Span};
use tracing::debug;

/// Follow-up prompts offered under an assistant message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionCards {
    suggestions: Vec<String>,
    selected: Option<usize>,
}

impl SuggestionCards {
    pub fn new(suggestions: Vec<String>) -> Self {
        Self {
            suggestions,
            selected: None,
        }
    }

    pub fn from_message(message: &ChatMessage) -> Self {
        let suggestions = message.suggestions().to_vec();
        if !suggestions.is_empty() {
            debug!(count = suggestions.len(), "message carries suggestions");
        }
        Self::new(suggestions)
    }

    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.suggestions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.suggestions.iter().map(String::as_str)
    }

    pub fn highlight(&mut self, index: usize) {
        if index < self.suggestions.len() {
            self.selected = Some(index);
        }
    }

    pub fn highlight_next(&mut self) {
        if self.suggestions.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) => (i + 1) % self.suggestions.len(),
            None => 0,
        });
    }

    /// The text to submit when card `index` is clicked.
    pub fn select(&self, index: usize) -> Option<&str> {
        self.suggestions.get(index).map(String::as_str)
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.and_then(|i| self.select(i))
    }

    /// All cards on one line, separated by a space.
    pub fn render_line(&self, theme: &Theme) -> Line<'static> {
        let mut spans = Vec::with_capacity(self.suggestions.len() * 2);
        for (i, suggestion) in self.suggestions.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            let style = if self.selected == Some(i) {
                theme.suggestion_selected_style
            } else {
                theme.suggestion_style
            };
            spans.push(Span::styled(format!(" {suggestion} "), style));
        }
        Line::from(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards() -> SuggestionCards {
        SuggestionCards::new(vec!["Tell me more".into(), "Give an example".into()])
    }

    #[test]
    fn empty_when_message_has_no_suggestions() {
        let cards = SuggestionCards::from_message(&ChatMessage::from_text("hi"));
        assert!(cards.is_empty());
        assert_eq!(cards.render_line(&Theme::dark_default()).spans.len(), 0);
    }

    #[test]
    fn select_returns_text() {
        let cards = cards();
        assert_eq!(cards.select(1), Some("Give an example"));
        assert_eq!(cards.select(2), None);
    }

    #[test]
    fn next_wraps_and_highlight_ignores_out_of_range() {
        let mut cards = cards();
        assert_eq!(cards.selected(), None);
        cards.highlight_next();
        assert_eq!(cards.selected(), Some("Tell me more"));
        cards.highlight_next();
        cards.highlight_next();
        assert_eq!(cards.selected(), Some("Tell me more"));
        cards.highlight(5);
        assert_eq!(cards.selected(), Some("Tell me more"));
    }

    #[test]
    fn render_line_styles_selected_card() {
        let theme = Theme::dark_default();
        let mut cards = cards();
        cards.highlight(1);
        let line = cards.render_line(&theme);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, " Tell me more   Give an example ");
        assert_eq!(line.spans[2].style, theme.suggestion_selected_style);
        assert_eq!(line.spans[0].style, theme.suggestion_style);
    }
}
