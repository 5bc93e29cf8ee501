use std::io::Write;
use std::process::{Command, Stdio};
use tracing::debug;

/// Destination for "Copy code".
pub trait Clipboard {
    fn copy(&mut self, text: &str) -> Result<(), String>;
}

/// The platform clipboard, reached through its command-line helpers.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn copy(&mut self, text: &str) -> Result<(), String> {
        copy_to_clipboard(text)
    }
}

pub fn copy_to_clipboard(text: &str) -> Result<(), String> {
    #[cfg(target_os = "macos")]
    {
        return run_with_stdin("pbcopy", &[], text);
    }
    #[cfg(target_os = "windows")]
    {
        return run_with_stdin("cmd", &["/C", "clip"], text);
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        for (cmd, args) in [
            ("wl-copy", &[][..]),
            ("xclip", &["-selection", "clipboard"][..]),
            ("xsel", &["--clipboard", "--input"][..]),
        ] {
            match run_with_stdin(cmd, args, text) {
                Ok(()) => return Ok(()),
                Err(err) => debug!(%err, "clipboard helper failed"),
            }
        }
        Err("No clipboard command found (install wl-copy, xclip, or xsel)".to_string())
    }
}

fn run_with_stdin(cmd: &str, args: &[&str], input: &str) -> Result<(), String> {
    match Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(mut child) => {
            let written = match child.stdin.take() {
                Some(mut stdin) => stdin.write_all(input.as_bytes()),
                None => Ok(()),
            };
            let status = child.wait();
            if let Err(err) = written {
                return Err(format!("Clipboard command `{}` failed: {}", cmd, err));
            }
            match status {
                Ok(status) if status.success() => Ok(()),
                _ => Err(format!("Clipboard command `{}` failed", cmd)),
            }
        }
        Err(_) => Err(format!("Clipboard command `{}` not available", cmd)),
    }
}


#[cfg(all(test, unix))]
mod tests {
    use super::run_with_stdin;

    #[test]
    fn helper_that_ignores_input_is_reported() {
        let input = "x".repeat(1 << 20);
        let err = run_with_stdin("true", &[], &input).unwrap_err();
        assert!(err.starts_with("Clipboard command `true` failed: "), "{err}");
    }

    #[test]
    fn helper_reading_all_input_succeeds() {
        assert_eq!(run_with_stdin("cat", &[], "hello"), Ok(()));
    }

    #[test]
    fn missing_helper_is_not_available() {
        let err = run_with_stdin("fencebox-no-such-helper", &[], "x").unwrap_err();
        assert_eq!(err, "Clipboard command `fencebox-no-such-helper` not available");
    }
}
