use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_COPY_RESET_MS: u64 = 3000;
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Overrides applied on top of the built-in Mermaid configuration.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct MermaidSettings {
    pub theme: Option<String>,
    pub font_family: Option<String>,
    pub security_level: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// UI theme name ("dark" or "light")
    pub theme: Option<String>,
    /// Enable syntax highlighting for code block bodies
    pub syntax: Option<bool>,
    /// How long a block stays marked as copied, in milliseconds
    pub copy_reset_ms: Option<u64>,
    /// Directory downloads are written to (defaults to the working directory)
    pub download_dir: Option<PathBuf>,
    /// tracing filter directive, e.g. "fencebox=debug"
    pub log_filter: Option<String>,
    #[serde(default)]
    pub mermaid: MermaidSettings,
}

impl Config {
    pub fn syntax_enabled(&self) -> bool {
        self.syntax.unwrap_or(true)
    }

    pub fn copy_reset_delay(&self) -> Duration {
        Duration::from_millis(self.copy_reset_ms.unwrap_or(DEFAULT_COPY_RESET_MS))
    }

    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
