//! Clipboard seam
//!
//! Write-only and fire-and-forget: failures are logged, never returned.

use std::io::Write;
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;

use tracing::{debug, warn};

pub trait Clipboard: Send + Sync {
    fn write(&self, text: &str);
}

/// Commands tried in order by [`SystemClipboard`]
const COMMANDS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("pbcopy", &[]),
];

/// Pipes text into the first available platform clipboard tool
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl SystemClipboard {
    fn try_command(program: &str, args: &[&str], text: &str) -> std::io::Result<bool> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        Self::feed(&mut child, text)
    }

    /// Write `text` to the child's stdin and reap it, on failure too
    fn feed(child: &mut Child, text: &str) -> std::io::Result<bool> {
        if let Some(mut stdin) = child.stdin.take()
            && let Err(e) = stdin.write_all(text.as_bytes())
        {
            drop(stdin);
            let _ = child.kill();
            child.wait()?;
            return Err(e);
        }
        Ok(child.wait()?.success())
    }
}

impl Clipboard for SystemClipboard {
    fn write(&self, text: &str) {
        debug!(len = text.len(), "SystemClipboard::write: called");
        for (program, args) in COMMANDS {
            match Self::try_command(program, args, text) {
                Ok(true) => {
                    debug!(%program, "SystemClipboard::write: copied");
                    return;
                }
                Ok(false) => debug!(%program, "SystemClipboard::write: command failed"),
                Err(e) => debug!(%program, error = %e, "SystemClipboard::write: command unavailable"),
            }
        }
        warn!("No clipboard tool available (tried wl-copy, xclip, pbcopy)");
    }
}

/// Records writes in memory
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Vec<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent write
    pub fn last(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|c| c.last().cloned())
    }

    pub fn writes(&self) -> usize {
        self.contents.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl Clipboard for MemoryClipboard {
    fn write(&self, text: &str) {
        debug!(len = text.len(), "MemoryClipboard::write: called");
        if let Ok(mut contents) = self.contents.lock() {
            contents.push(text.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_clipboard_keeps_last_write() {
        let clipboard = MemoryClipboard::new();
        assert_eq!(clipboard.last(), None);
        clipboard.write("first");
        clipboard.write("second");
        assert_eq!(clipboard.last().as_deref(), Some("second"));
        assert_eq!(clipboard.writes(), 2);
    }

    #[test]
    fn test_missing_tool_is_reported_not_fatal() {
        let result = SystemClipboard::try_command("vidprompt-no-such-clipboard-tool", &[], "text");
        assert!(result.is_err());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_failed_write_still_reaps_child() {
        let mut child = Command::new("true")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .unwrap();
        let pid = child.id();
        std::thread::sleep(std::time::Duration::from_millis(50));

        // The child exits without reading, so a large write hits a closed pipe
        let text = "x".repeat(4 * 1024 * 1024);
        assert!(SystemClipboard::feed(&mut child, &text).is_err());
        assert!(!std::path::Path::new(&format!("/proc/{}", pid)).exists());
    }
}
