use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::core::message::ChatMessage;

#[derive(Debug)]
pub struct InputError {
    path: PathBuf,
    source: io::Error,
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if is_stdin(&self.path) {
            write!(f, "Failed to read message from stdin: {}", self.source)
        } else {
            write!(
                f,
                "Failed to read message from {}: {}",
                self.path.display(),
                self.source
            )
        }
    }
}

impl std::error::Error for InputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

pub fn is_stdin(path: &Path) -> bool {
    path == Path::new("-")
}

/// Read a message from `path`, or from stdin when `path` is `-`.
pub fn read_message(path: &Path) -> Result<ChatMessage, InputError> {
    let raw = if is_stdin(path) {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|source| InputError {
                path: path.to_path_buf(),
                source,
            })?;
        buf
    } else {
        fs::read_to_string(path).map_err(|source| InputError {
            path: path.to_path_buf(),
            source,
        })?
    };
    Ok(ChatMessage::from_input(&raw))
}
