//! `fencebox set` / `fencebox unset` handling.

use std::fmt;
use std::path::PathBuf;

use crate::core::config::Config;

pub const SETTING_KEYS: [&str; 8] = [
    "theme",
    "syntax",
    "copy-reset-ms",
    "download-dir",
    "log-filter",
    "mermaid-theme",
    "mermaid-font",
    "mermaid-security-level",
];

/// Errors that can occur when modifying configuration settings.
#[derive(Debug, PartialEq, Eq)]
pub enum SettingError {
    /// The provided setting key is not recognized.
    UnknownKey(String),
    /// The provided theme identifier was not found.
    UnknownTheme { input: String },
    /// The provided value could not be parsed as a boolean.
    InvalidBoolean(String),
    /// The provided value could not be parsed as a number of milliseconds.
    InvalidNumber(String),
}

impl SettingError {
    /// Print the error message to stderr with appropriate formatting.
    pub fn print(&self) {
        match self {
            SettingError::UnknownKey(key) => {
                eprintln!("❌ Unknown config key: {key}");
                eprintln!("   Known keys: {}", SETTING_KEYS.join(", "));
            }
            SettingError::UnknownTheme { input } => {
                eprintln!("❌ Unknown theme: {input}. Use 'dark' or 'light'.");
            }
            SettingError::InvalidBoolean(input) => {
                eprintln!("❌ Invalid boolean value: {input}");
                eprintln!("   Use 'on' or 'off' (also accepts true/false, yes/no)");
            }
            SettingError::InvalidNumber(input) => {
                eprintln!("❌ Invalid number of milliseconds: {input}");
            }
        }
    }

    /// Returns the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingError::UnknownKey(key) => write!(f, "Unknown config key: {key}"),
            SettingError::UnknownTheme { input } => write!(f, "Unknown theme: {input}"),
            SettingError::InvalidBoolean(input) => write!(f, "Invalid boolean value: {input}"),
            SettingError::InvalidNumber(input) => write!(f, "Invalid number: {input}"),
        }
    }
}

impl std::error::Error for SettingError {}

/// Parse a boolean value from user input.
///
/// Accepts: on/off, true/false, yes/no (case-insensitive).
pub fn parse_bool(input: &str) -> Option<bool> {
    match input.to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

pub fn apply_set(config: &mut Config, key: &str, value: &str) -> Result<(), SettingError> {
    match key {
        "theme" => {
            let theme = value.to_ascii_lowercase();
            if theme != "dark" && theme != "light" {
                return Err(SettingError::UnknownTheme {
                    input: value.to_string(),
                });
            }
            config.theme = Some(theme);
        }
        "syntax" => {
            let enabled =
                parse_bool(value).ok_or_else(|| SettingError::InvalidBoolean(value.to_string()))?;
            config.syntax = Some(enabled);
        }
        "copy-reset-ms" => {
            let ms = value
                .parse::<u64>()
                .map_err(|_| SettingError::InvalidNumber(value.to_string()))?;
            config.copy_reset_ms = Some(ms);
        }
        "download-dir" => config.download_dir = Some(PathBuf::from(value)),
        "log-filter" => config.log_filter = Some(value.to_string()),
        "mermaid-theme" => config.mermaid.theme = Some(value.to_string()),
        "mermaid-font" => config.mermaid.font_family = Some(value.to_string()),
        "mermaid-security-level" => config.mermaid.security_level = Some(value.to_string()),
        _ => return Err(SettingError::UnknownKey(key.to_string())),
    }
    Ok(())
}

pub fn apply_unset(config: &mut Config, key: &str) -> Result<(), SettingError> {
    match key {
        "theme" => config.theme = None,
        "syntax" => config.syntax = None,
        "copy-reset-ms" => config.copy_reset_ms = None,
        "download-dir" => config.download_dir = None,
        "log-filter" => config.log_filter = None,
        "mermaid-theme" => config.mermaid.theme = None,
        "mermaid-font" => config.mermaid.font_family = None,
        "mermaid-security-level" => config.mermaid.security_level = None,
        _ => return Err(SettingError::UnknownKey(key.to_string())),
    }
    Ok(())
}
