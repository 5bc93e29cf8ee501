use std::error::Error;
use std::fmt;
use std::io::{self, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use ratatui::text::Line;

use crate::core::config::Config;
use crate::ui::code_block::CodeBlockState;
use crate::ui::markdown::{code_blocks, MessageCodeBlock};
use crate::ui::mermaid::{is_mermaid_language, HtmlDiagramRenderer};
use crate::ui::theme::Theme;
use crate::utils::clipboard::{Clipboard, SystemClipboard};
use crate::utils::download::{
    download_code, download_diagram, DownloadError, DownloadOutcome, FileNamePrompt, FixedName,
    LinePrompt,
};

#[derive(Debug, PartialEq, Eq)]
pub enum BlockError {
    /// Requested block number is outside `1..=count`.
    OutOfRange { index: usize, count: usize },
    NotDiagram { index: usize, lang: String },
    /// The clipboard helper rejected the copy.
    Clipboard(String),
    /// The message came from stdin, so there is nothing left to answer the
    /// file name prompt.
    NameRequired,
}

impl fmt::Display for BlockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockError::OutOfRange { index, count: 0 } => {
                write!(f, "Block {index} not found: message has no code blocks")
            }
            BlockError::OutOfRange { index, count } => {
                write!(f, "Block {index} not found: message has {count} code block(s)")
            }
            BlockError::NotDiagram { index, lang } => {
                write!(f, "Block {index} is `{lang}`, not a Mermaid diagram")
            }
            BlockError::Clipboard(reason) => write!(f, "Copy failed: {reason}"),
            BlockError::NameRequired => write!(
                f,
                "Message was read from stdin; pass --name to choose the file name"
            ),
        }
    }
}

impl Error for BlockError {}

pub fn pick_block(text: &str, index: usize) -> Result<MessageCodeBlock, BlockError> {
    let mut blocks = code_blocks(text);
    let count = blocks.len();
    if index == 0 || index > count {
        return Err(BlockError::OutOfRange { index, count });
    }
    Ok(blocks.swap_remove(index - 1))
}

pub fn line_to_string(line: &Line) -> String {
    line.spans.iter().map(|s| s.content.as_ref()).collect()
}

pub fn list_blocks(text: &str, out: &mut dyn Write) -> io::Result<()> {
    let blocks = code_blocks(text);
    if blocks.is_empty() {
        return writeln!(out, "(no code blocks)");
    }
    for (i, block) in blocks.iter().enumerate() {
        let lang = if block.lang.is_empty() {
            "text"
        } else {
            block.lang.as_str()
        };
        let first_line = block.code.lines().next().unwrap_or("");
        writeln!(
            out,
            "{:>3}. [{}] {} line(s)  {}",
            i + 1,
            lang,
            block.code.lines().count(),
            first_line
        )?;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ShowOptions {
    pub only: Option<usize>,
    pub collapsed: bool,
    pub diagram: bool,
    pub syntax: bool,
}

pub fn show_blocks(
    text: &str,
    theme: &Theme,
    options: ShowOptions,
    out: &mut dyn Write,
) -> Result<(), Box<dyn Error>> {
    let selected: Vec<(usize, MessageCodeBlock)> = match options.only {
        Some(index) => vec![(index, pick_block(text, index)?)],
        None => code_blocks(text)
            .into_iter()
            .enumerate()
            .map(|(i, b)| (i + 1, b))
            .collect(),
    };

    let now = Instant::now();
    for (index, block) in selected {
        let mut state = CodeBlockState::new(block.lang, block.code);
        if options.diagram {
            state.toggle_diagram();
        }
        if options.collapsed {
            state.toggle_collapsed();
        }
        writeln!(out, "#{index}")?;
        for line in state.render_lines(theme, options.syntax, now) {
            writeln!(out, "{}", line_to_string(&line))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn copy_block(text: &str, index: usize, config: &Config) -> Result<(), Box<dyn Error>> {
    copy_block_to(
        text,
        index,
        config.copy_reset_delay(),
        &mut SystemClipboard,
        &mut io::stdout(),
    )
}

fn copy_block_to(
    text: &str,
    index: usize,
    reset: Duration,
    clipboard: &mut dyn Clipboard,
    out: &mut dyn Write,
) -> Result<(), Box<dyn Error>> {
    let block = pick_block(text, index)?;
    let mut state = CodeBlockState::new(block.lang, block.code).with_copy_reset(reset);
    let copied = state
        .copy(clipboard, Instant::now())
        .map_err(BlockError::Clipboard)?;
    if copied {
        writeln!(out, "✅ Copied block {index} to clipboard")?;
    } else {
        writeln!(out, "Block {index} is empty; nothing copied")?;
    }
    Ok(())
}

pub fn download_block(
    text: &str,
    index: usize,
    dir: &Path,
    name: Option<String>,
    force: bool,
) -> Result<(), Box<dyn Error>> {
    let block = pick_block(text, index)?;
    let outcome = match name {
        Some(name) => download_code(dir, &block.lang, &block.code, &mut FixedName(Some(name)), force),
        None => {
            let stdin = io::stdin();
            let mut prompt = LinePrompt::new(stdin.lock(), io::stderr());
            save_with_prompt(dir, &block, &mut prompt, force)
        }
    };
    report_outcome(outcome)
}

fn save_with_prompt(
    dir: &Path,
    block: &MessageCodeBlock,
    prompt: &mut dyn FileNamePrompt,
    force: bool,
) -> Result<DownloadOutcome, DownloadError> {
    download_code(dir, &block.lang, &block.code, prompt, force)
}

pub fn export_diagram(
    text: &str,
    index: usize,
    dir: &Path,
    force: bool,
) -> Result<(), Box<dyn Error>> {
    let block = pick_block(text, index)?;
    if !is_mermaid_language(&block.lang) {
        return Err(Box::new(BlockError::NotDiagram {
            index,
            lang: block.lang,
        }));
    }
    let renderer = HtmlDiagramRenderer::from_active();
    report_outcome(download_diagram(dir, &renderer, &block.code, force))
}

fn report_outcome(outcome: Result<DownloadOutcome, DownloadError>) -> Result<(), Box<dyn Error>> {
    match outcome {
        Ok(DownloadOutcome::Saved(path)) => {
            println!("✅ Saved to {}", path.display());
            Ok(())
        }
        Ok(DownloadOutcome::Cancelled) => Ok(()),
        Err(DownloadError::Exists(path)) => {
            eprintln!(
                "⚠️  File already exists: {} (use --force to overwrite)",
                path.display()
            );
            std::process::exit(1);
        }
        Err(err) => Err(Box::new(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::clipboard::test_support::MemoryClipboard;
    use tempfile::tempdir;

    const COPY_RESET: Duration = Duration::from_millis(10);
    const MESSAGE: &str = "Here:\n\n```python\nprint('hi')\n```\n\n```mermaid\ngraph TD\nA-->B\n```\n";

    #[test]
    fn pick_block_is_one_based() {
        assert_eq!(pick_block(MESSAGE, 1).unwrap().lang, "python");
        assert_eq!(pick_block(MESSAGE, 2).unwrap().lang, "mermaid");
        assert_eq!(
            pick_block(MESSAGE, 0),
            Err(BlockError::OutOfRange { index: 0, count: 2 })
        );
        assert_eq!(
            pick_block(MESSAGE, 3),
            Err(BlockError::OutOfRange { index: 3, count: 2 })
        );
    }

    #[test]
    fn list_blocks_summarizes() {
        let mut out = Vec::new();
        list_blocks(MESSAGE, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(
            out,
            "  1. [python] 1 line(s)  print('hi')\n  2. [mermaid] 2 line(s)  graph TD\n"
        );

        let mut out = Vec::new();
        list_blocks("no code", &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "(no code blocks)\n");
    }

    #[test]
    fn show_collapsed_prints_headers_only() {
        let mut out = Vec::new();
        let options = ShowOptions {
            collapsed: true,
            ..Default::default()
        };
        show_blocks(MESSAGE, &Theme::dark_default(), options, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("#1\n python "));
        assert!(out.contains("Expand"));
        assert!(!out.contains("print('hi')"));
    }

    #[test]
    fn show_single_diagram_block() {
        let mut out = Vec::new();
        let options = ShowOptions {
            only: Some(2),
            diagram: true,
            ..Default::default()
        };
        show_blocks(MESSAGE, &Theme::dark_default(), options, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("#2\n"));
        assert!(out.contains("Show code"));
        assert!(out.contains("[diagram]\ngraph TD\nA-->B\n"));
    }

    #[test]
    fn copy_reports_success_only_after_clipboard_accepts() {
        let mut clipboard = MemoryClipboard::default();
        let mut out = Vec::new();
        copy_block_to(MESSAGE, 1, COPY_RESET, &mut clipboard, &mut out).unwrap();
        assert_eq!(clipboard.copies, vec!["print('hi')\n"]);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "✅ Copied block 1 to clipboard\n"
        );
    }

    #[test]
    fn copy_fails_when_clipboard_rejects() {
        let mut clipboard = MemoryClipboard {
            fail: true,
            ..Default::default()
        };
        let mut out = Vec::new();
        let err = copy_block_to(MESSAGE, 1, COPY_RESET, &mut clipboard, &mut out).unwrap_err();
        assert_eq!(err.to_string(), "Copy failed: clipboard unavailable");
        assert!(out.is_empty());
    }

    #[test]
    fn prompted_download_uses_suggestion_on_empty_answer() {
        let dir = tempdir().unwrap();
        let block = pick_block(MESSAGE, 1).unwrap();
        let mut prompt = LinePrompt::new("\n".as_bytes(), Vec::new());

        let outcome = save_with_prompt(dir.path(), &block, &mut prompt, false).unwrap();
        let DownloadOutcome::Saved(path) = outcome else {
            panic!("expected a saved file");
        };
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("file-") && name.ends_with(".py"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "print('hi')\n");
    }

    #[test]
    fn export_rejects_non_diagram_block() {
        let dir = tempdir().unwrap();
        let err = export_diagram(MESSAGE, 1, dir.path(), false).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Block 1 is `python`, not a Mermaid diagram"
        );
    }

    #[test]
    fn export_writes_diagram_document() {
        let dir = tempdir().unwrap();
        export_diagram(MESSAGE, 2, dir.path(), false).unwrap();
        let doc = std::fs::read_to_string(dir.path().join("mermaid-chart.html")).unwrap();
        assert!(doc.contains("graph TD\nA--&gt;B"));
    }
}
