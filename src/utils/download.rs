//! Saving code blocks and diagrams as files.

use crate::ui::mermaid::DiagramRenderer;
use std::fmt;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const FALLBACK_EXTENSION: &str = ".file";

/// Characters used for generated names. Look-alikes (Z/2, I/1, O/0) are left out.
const NAME_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXY3456789";

pub fn language_extension(lang: &str) -> &'static str {
    match lang {
        "javascript" => ".js",
        "python" => ".py",
        "java" => ".java",
        "c" => ".c",
        "cpp" | "c++" => ".cpp",
        "c#" => ".cs",
        "ruby" => ".rb",
        "php" => ".php",
        "swift" => ".swift",
        "objective-c" => ".m",
        "kotlin" => ".kt",
        "typescript" => ".ts",
        "go" => ".go",
        "perl" => ".pl",
        "rust" => ".rs",
        "scala" => ".scala",
        "haskell" => ".hs",
        "lua" => ".lua",
        "shell" => ".sh",
        "sql" => ".sql",
        "html" => ".html",
        "css" => ".css",
        _ => FALLBACK_EXTENSION,
    }
}

const UNBIASED_BYTE_LIMIT: usize = 256 - 256 % NAME_ALPHABET.len();

pub fn generate_random_string(length: usize, lowercase: bool) -> String {
    let mut name = String::with_capacity(length);
    let mut bytes = [0u8; 32];
    while name.len() < length {
        if let Err(err) = getrandom::fill(&mut bytes) {
            warn!(error = %err, "system randomness unavailable, using clock-derived name");
            push_clock_chars(&mut name, length);
            break;
        }
        push_unbiased_chars(&mut name, &bytes, length);
    }

    if lowercase {
        name.to_lowercase()
    } else {
        name
    }
}

fn push_unbiased_chars(name: &mut String, bytes: &[u8], length: usize) {
    for &b in bytes {
        if name.len() == length {
            return;
        }
        if (b as usize) < UNBIASED_BYTE_LIMIT {
            name.push(NAME_ALPHABET[b as usize % NAME_ALPHABET.len()] as char);
        }
    }
}

fn push_clock_chars(name: &mut String, length: usize) {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or_default();
    for i in name.len()..length {
        let byte = (nanos >> ((i % 4) * 8)) as u8;
        name.push(NAME_ALPHABET[byte as usize % NAME_ALPHABET.len()] as char);
    }
}

pub fn suggested_file_name(lang: &str) -> String {
    format!(
        "file-{}{}",
        generate_random_string(3, true),
        language_extension(lang)
    )
}

/// Asks the user for the name to save under. `None` means the user backed out.
pub trait FileNamePrompt {
    fn prompt(&mut self, suggested: &str) -> Option<String>;
}

/// Uses a name chosen up front, without asking.
pub struct FixedName(pub Option<String>);

impl FileNamePrompt for FixedName {
    fn prompt(&mut self, _suggested: &str) -> Option<String> {
        self.0.take()
    }
}

/// Line-based prompt. An empty answer accepts the suggestion; end of input
/// cancels.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> FileNamePrompt for LinePrompt<R, W> {
    fn prompt(&mut self, suggested: &str) -> Option<String> {
        write!(self.output, "Enter file name [{suggested}]: ").ok()?;
        self.output.flush().ok()?;

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                let answer = answer.trim();
                if answer.is_empty() {
                    Some(suggested.to_string())
                } else {
                    Some(answer.to_string())
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Saved(PathBuf),
    Cancelled,
}

#[derive(Debug)]
pub enum DownloadError {
    /// Target exists and overwriting was not requested.
    Exists(PathBuf),
    Io { path: PathBuf, source: io::Error },
    Render(String),
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadError::Exists(path) => write!(f, "File already exists: {}", path.display()),
            DownloadError::Io { path, source } => {
                write!(f, "Error saving {}: {}", path.display(), source)
            }
            DownloadError::Render(msg) => write!(f, "Diagram could not be rendered: {msg}"),
        }
    }
}

impl std::error::Error for DownloadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DownloadError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn write_file(path: &Path, content: &str, overwrite: bool) -> Result<(), DownloadError> {
    if path.exists() && !overwrite {
        return Err(DownloadError::Exists(path.to_path_buf()));
    }
    fs::write(path, content).map_err(|source| DownloadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Save a code block under a name the user picks, defaulting to a generated
/// name with an extension for `lang`.
pub fn download_code(
    dir: &Path,
    lang: &str,
    content: &str,
    prompt: &mut dyn FileNamePrompt,
    overwrite: bool,
) -> Result<DownloadOutcome, DownloadError> {
    let suggested = suggested_file_name(lang);
    let Some(file_name) = prompt.prompt(&suggested).filter(|name| !name.is_empty()) else {
        debug!("download cancelled at file name prompt");
        return Ok(DownloadOutcome::Cancelled);
    };

    let path = dir.join(file_name);
    write_file(&path, content, overwrite)?;
    debug!(path = %path.display(), bytes = content.len(), "saved code block");
    Ok(DownloadOutcome::Saved(path))
}

/// Export a diagram through `renderer` under the renderer's fixed file name.
pub fn download_diagram(
    dir: &Path,
    renderer: &dyn DiagramRenderer,
    chart: &str,
    overwrite: bool,
) -> Result<DownloadOutcome, DownloadError> {
    let document = renderer
        .render(chart)
        .map_err(|err| DownloadError::Render(err.to_string()))?;
    let path = dir.join(renderer.file_name());
    write_file(&path, &document, overwrite)?;
    debug!(path = %path.display(), "exported diagram");
    Ok(DownloadOutcome::Saved(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn language_extension_lookup() {
        assert_eq!(language_extension("python"), ".py");
        assert_eq!(language_extension("c++"), ".cpp");
        assert_eq!(language_extension("c#"), ".cs");
        assert_eq!(language_extension("objective-c"), ".m");
        assert_eq!(language_extension("brainfuck"), ".file");
        assert_eq!(language_extension(""), ".file");
    }

    #[test]
    fn random_string_uses_alphabet() {
        let upper = generate_random_string(64, false);
        assert_eq!(upper.len(), 64);
        assert!(upper.bytes().all(|b| NAME_ALPHABET.contains(&b)));

        let lower = generate_random_string(16, true);
        assert!(lower
            .chars()
            .all(|c| c.is_ascii_lowercase() || ('3'..='9').contains(&c)));
    }

    #[test]
    fn bytes_past_last_full_alphabet_cycle_are_skipped() {
        assert_eq!(UNBIASED_BYTE_LIMIT, 240);
        let mut name = String::new();
        push_unbiased_chars(&mut name, &[240, 239, 255, 0, 30, 1], 3);
        assert_eq!(name, "9AA");
    }

    #[test]
    fn suggested_name_shape() {
        let name = suggested_file_name("rust");
        assert!(name.starts_with("file-"));
        assert!(name.ends_with(".rs"));
        assert_eq!(name.len(), "file-".len() + 3 + ".rs".len());
    }

    #[test]
    fn download_code_writes_chosen_name() {
        let dir = tempdir().unwrap();
        let mut prompt = FixedName(Some("main.py".into()));

        let outcome =
            download_code(dir.path(), "python", "print(1)\n", &mut prompt, false).unwrap();

        let path = dir.path().join("main.py");
        assert_eq!(outcome, DownloadOutcome::Saved(path.clone()));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "print(1)\n");
    }

    #[test]
    fn cancelled_prompt_writes_nothing() {
        let dir = tempdir().unwrap();

        let outcome =
            download_code(dir.path(), "python", "x", &mut FixedName(None), false).unwrap();
        assert_eq!(outcome, DownloadOutcome::Cancelled);

        let outcome = download_code(
            dir.path(),
            "python",
            "x",
            &mut FixedName(Some(String::new())),
            false,
        )
        .unwrap();
        assert_eq!(outcome, DownloadOutcome::Cancelled);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn existing_file_needs_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.js");
        std::fs::write(&path, "old").unwrap();

        let err = download_code(
            dir.path(),
            "javascript",
            "new",
            &mut FixedName(Some("a.js".into())),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, DownloadError::Exists(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old");

        download_code(
            dir.path(),
            "javascript",
            "new",
            &mut FixedName(Some("a.js".into())),
            true,
        )
        .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn line_prompt_accepts_default_and_detects_eof() {
        let mut out = Vec::new();
        let mut prompt = LinePrompt::new("\n".as_bytes(), &mut out);
        assert_eq!(prompt.prompt("file-abc.py").as_deref(), Some("file-abc.py"));

        let mut prompt = LinePrompt::new("notes.txt\n".as_bytes(), Vec::new());
        assert_eq!(prompt.prompt("file-abc.py").as_deref(), Some("notes.txt"));

        let mut prompt = LinePrompt::new("".as_bytes(), Vec::new());
        assert_eq!(prompt.prompt("file-abc.py"), None);

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Enter file name [file-abc.py]: "
        );
    }
}
