//! Mermaid diagram support for code blocks.
//!
//! Layout and drawing belong to the Mermaid library itself. This module owns
//! its configuration, which must be installed once with [`initialize`] at
//! startup, and produces exportable documents that run Mermaid with it.

use crate::core::config::MermaidSettings;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

pub const MERMAID_LANGUAGES: [&str; 3] = ["mermaid", "mermaid-flowchart", "mermaidjs"];

const MERMAID_SCRIPT_URL: &str = "https://cdn.jsdelivr.net/npm/mermaid/dist/mermaid.min.js";

const DEFAULT_THEME_CSS: &str = "
    g.classGroup rect { fill: #282a36; stroke: #6272a4; }
    g.classGroup text { fill: #f8f8f2; }
    g.classGroup line { stroke: #f8f8f2; stroke-width: 0.5; }
    .classLabel .box { stroke: #21222c; stroke-width: 3; fill: #21222c; opacity: 1; }
    .classLabel .label { fill: #f1fa8c; }
    .relation { stroke: #ff79c6; stroke-width: 1; }
    #compositionStart, #compositionEnd { fill: #bd93f9; stroke: #bd93f9; stroke-width: 1; }
    #aggregationEnd, #aggregationStart { fill: #21222c; stroke: #50fa7b; stroke-width: 1; }
    #dependencyStart, #dependencyEnd { fill: #00bcd4; stroke: #00bcd4; stroke-width: 1; }
    #extensionStart, #extensionEnd { fill: #f8f8f2; stroke: #f8f8f2; stroke-width: 1; }";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeVariables {
    pub primary_color: String,
    pub primary_text_color: String,
    pub primary_border_color: String,
    pub line_color: String,
    pub secondary_color: String,
    pub tertiary_color: String,
    pub background_color: String,
}

impl Default for ThemeVariables {
    fn default() -> Self {
        Self {
            primary_color: "rgb(32, 33, 35)".into(),
            primary_text_color: "#fff".into(),
            primary_border_color: "rgb(32, 33, 35)".into(),
            line_color: "#F8B229".into(),
            secondary_color: "#006100".into(),
            tertiary_color: "#fff".into(),
            background_color: "#000".into(),
        }
    }
}

/// Settings passed to `mermaid.initialize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MermaidConfig {
    pub start_on_load: bool,
    pub theme: String,
    pub theme_variables: ThemeVariables,
    pub security_level: String,
    #[serde(rename = "themeCSS")]
    pub theme_css: String,
    pub font_family: String,
}

impl Default for MermaidConfig {
    fn default() -> Self {
        Self {
            start_on_load: true,
            theme: "base".into(),
            theme_variables: ThemeVariables::default(),
            security_level: "loose".into(),
            theme_css: DEFAULT_THEME_CSS.into(),
            font_family: "Fira Code".into(),
        }
    }
}

impl MermaidConfig {
    pub fn with_settings(settings: &MermaidSettings) -> Self {
        let mut config = Self::default();
        if let Some(theme) = &settings.theme {
            config.theme = theme.clone();
        }
        if let Some(font) = &settings.font_family {
            config.font_family = font.clone();
        }
        if let Some(level) = &settings.security_level {
            config.security_level = level.clone();
        }
        config
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MermaidError {
    AlreadyInitialized,
    EmptyChart,
}

impl fmt::Display for MermaidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MermaidError::AlreadyInitialized => write!(f, "Mermaid is already initialized"),
            MermaidError::EmptyChart => write!(f, "Diagram source is empty"),
        }
    }
}

impl std::error::Error for MermaidError {}

static MERMAID_CONFIG: OnceLock<MermaidConfig> = OnceLock::new();

/// Install the process-wide Mermaid configuration. Only the first call wins.
pub fn initialize(config: MermaidConfig) -> Result<&'static MermaidConfig, MermaidError> {
    let mut installed = false;
    let active = MERMAID_CONFIG.get_or_init(|| {
        installed = true;
        config
    });
    if installed {
        Ok(active)
    } else {
        Err(MermaidError::AlreadyInitialized)
    }
}

pub fn active_config() -> Option<&'static MermaidConfig> {
    MERMAID_CONFIG.get()
}

pub fn is_mermaid_language(lang: &str) -> bool {
    MERMAID_LANGUAGES.contains(&lang)
}

/// Diagram source as Mermaid expects it: one trailing newline removed.
pub fn prepare_chart(value: &str) -> &str {
    value.strip_suffix('\n').unwrap_or(value)
}

/// Turns diagram source into a document that can be saved.
pub trait DiagramRenderer {
    fn render(&self, chart: &str) -> Result<String, MermaidError>;

    fn file_name(&self) -> &str {
        "mermaid-chart.svg"
    }
}

/// Standalone HTML page that draws the diagram with the Mermaid runtime.
pub struct HtmlDiagramRenderer {
    config: MermaidConfig,
}

impl HtmlDiagramRenderer {
    pub fn new(config: MermaidConfig) -> Self {
        Self { config }
    }

    /// Renderer using the installed configuration, or the defaults when
    /// [`initialize`] has not run.
    pub fn from_active() -> Self {
        Self::new(active_config().cloned().unwrap_or_default())
    }
}

impl DiagramRenderer for HtmlDiagramRenderer {
    fn render(&self, chart: &str) -> Result<String, MermaidError> {
        let chart = prepare_chart(chart);
        if chart.trim().is_empty() {
            return Err(MermaidError::EmptyChart);
        }

        Ok(format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
             <script src=\"{MERMAID_SCRIPT_URL}\"></script>\n</head>\n\
             <body style=\"background: {bg}\">\n\
             <div class=\"mermaid\">\n{chart}\n</div>\n\
             <script>mermaid.initialize({config});</script>\n\
             </body>\n</html>\n",
            bg = self.config.theme_variables.background_color,
            chart = escape_html(chart),
            config = self.config.to_json(),
        ))
    }

    fn file_name(&self) -> &str {
        "mermaid-chart.html"
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
