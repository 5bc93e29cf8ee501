//! Per-block view state and rendering for message code blocks.

use crate::ui::mermaid::{is_mermaid_language, prepare_chart};
use crate::ui::theme::Theme;
use crate::utils::clipboard::Clipboard;
use ratatui::text::{Line, Span};
use std::time::{Duration, Instant};
use tracing::warn;

pub const COPY_RESET_DELAY: Duration = Duration::from_millis(3000);

/// Pending reset of the "Copied!" marker. Arming again replaces the
/// previous deadline.
#[derive(Debug, Clone, Copy)]
pub struct CopyTimer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl CopyTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_active(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now < deadline)
    }

    /// Clear an expired deadline. Returns true when it fired on this call.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for CopyTimer {
    fn default() -> Self {
        Self::new(COPY_RESET_DELAY)
    }
}

#[derive(Debug, Clone)]
pub struct CodeBlockState {
    lang: String,
    code: String,
    plugin: bool,
    error: bool,
    copy_timer: CopyTimer,
    show_diagram: bool,
    collapsed: bool,
}

impl CodeBlockState {
    pub fn new(lang: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            code: code.into(),
            plugin: false,
            error: false,
            copy_timer: CopyTimer::default(),
            show_diagram: false,
            collapsed: false,
        }
    }

    /// Output of a plugin call: shown as JSON with no actions.
    pub fn plugin(mut self) -> Self {
        self.plugin = true;
        self
    }

    /// Error payload: shown as JSON with icon-only actions.
    pub fn error(mut self) -> Self {
        self.error = true;
        self
    }

    pub fn with_copy_reset(mut self, delay: Duration) -> Self {
        self.copy_timer = CopyTimer::new(delay);
        self
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Language used for highlighting and diagram detection.
    pub fn display_language(&self) -> &str {
        if self.plugin || self.error {
            "json"
        } else {
            &self.lang
        }
    }

    pub fn is_diagram(&self) -> bool {
        is_mermaid_language(self.display_language())
    }

    /// Copy the block to `clipboard` and mark it copied until the reset delay
    /// passes. Empty blocks are ignored (`Ok(false)`).
    ///
    /// The marker is set even when the clipboard write fails; the failure is
    /// returned for callers that report it.
    pub fn copy(&mut self, clipboard: &mut dyn Clipboard, now: Instant) -> Result<bool, String> {
        if self.code.is_empty() {
            return Ok(false);
        }
        self.copy_timer.arm(now);
        clipboard.copy(&self.code).map_err(|err| {
            warn!(%err, "copy to clipboard failed");
            err
        })?;
        Ok(true)
    }

    pub fn is_copied(&self, now: Instant) -> bool {
        self.copy_timer.is_active(now)
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        self.copy_timer.tick(now)
    }

    pub fn show_diagram(&self) -> bool {
        self.show_diagram
    }

    /// Switch between diagram and source views. Only diagram blocks toggle.
    pub fn toggle_diagram(&mut self) -> bool {
        if !self.is_diagram() {
            return false;
        }
        self.show_diagram = !self.show_diagram;
        true
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn toggle_collapsed(&mut self) {
        self.collapsed = !self.collapsed;
    }

    /// Header bar followed by the body, which is omitted while collapsed.
    pub fn render_lines(&self, theme: &Theme, syntax: bool, now: Instant) -> Vec<Line<'static>> {
        let mut lines = vec![self.header_line(theme, now)];
        if self.collapsed {
            return lines;
        }

        if self.show_diagram {
            let style = theme.codeblock_body_style();
            lines.push(Line::from(Span::styled("[diagram]", style)));
            lines.extend(
                prepare_chart(&self.code)
                    .lines()
                    .map(|l| Line::from(Span::styled(l.to_string(), style))),
            );
            return lines;
        }

        let body = self.code.strip_suffix('\n').unwrap_or(&self.code);
        let highlighted = if syntax && !self.plugin && !self.error {
            crate::utils::syntax::highlight_code_block(self.display_language(), body, theme)
        } else {
            None
        };
        lines.extend(highlighted.unwrap_or_else(|| plain_lines(body, theme)));
        lines
    }

    fn header_line(&self, theme: &Theme, now: Instant) -> Line<'static> {
        let header = theme.codeblock_header_style;
        let action = theme.codeblock_action_style;
        let mut spans = vec![Span::styled(format!(" {} ", self.lang), header)];

        if self.plugin {
            spans.push(Span::styled(" ⓘ ", action));
            return Line::from(spans);
        }

        let copied = self.is_copied(now);
        let copy_label = match (copied, self.error) {
            (true, false) => " ✓ Copied! ",
            (true, true) => " ✓ ",
            (false, false) => " ⧉ Copy code ",
            (false, true) => " ⧉ ",
        };
        let copy_style = if copied {
            theme.codeblock_action_active_style
        } else {
            action
        };
        spans.push(Span::styled(copy_label, copy_style));
        spans.push(Span::styled(" ⤓ Download As File ", action));
        if self.is_diagram() {
            let label = if self.show_diagram {
                " Show code "
            } else {
                " Show diagram "
            };
            spans.push(Span::styled(label, action));
        }
        let collapse = if self.collapsed { " Expand " } else { " Collapse " };
        spans.push(Span::styled(collapse, action));
        Line::from(spans)
    }
}

fn plain_lines(body: &str, theme: &Theme) -> Vec<Line<'static>> {
    let style = theme.codeblock_body_style();
    body.lines()
        .map(|l| Line::from(Span::styled(l.replace('\t', "    "), style)))
        .collect()
}
