use crate::core::config::data::{path_display, Config};
use std::path::Path;

impl Config {
    pub fn print_all(&self, path: &Path) {
        println!("Configuration ({}):", path_display(path));
        match &self.theme {
            Some(theme) => println!("  theme: {theme}"),
            None => println!("  theme: (unset)"),
        }
        match self.syntax_enabled() {
            true => println!("  syntax: on"),
            false => println!("  syntax: off"),
        }
        println!("  copy-reset-ms: {}", self.copy_reset_delay().as_millis());
        println!("  download-dir: {}", path_display(self.download_dir()));
        println!("  log-filter: {}", self.log_filter());

        let mermaid = &self.mermaid;
        if mermaid.theme.is_none()
            && mermaid.font_family.is_none()
            && mermaid.security_level.is_none()
        {
            println!("  mermaid: (defaults)");
        } else {
            println!("  mermaid:");
            if let Some(theme) = &mermaid.theme {
                println!("    theme: {theme}");
            }
            if let Some(font) = &mermaid.font_family {
                println!("    font-family: {font}");
            }
            if let Some(level) = &mermaid.security_level {
                println!("    security-level: {level}");
            }
        }
    }
}
