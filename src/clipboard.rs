//! Best-effort system clipboard support.
//!
//! Shells out to the platform clipboard tool. Callers treat failure as
//! a signal to display the text instead.

use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, bail};

#[cfg(target_os = "macos")]
const TOOLS: &[&[&str]] = &[&["pbcopy"]];

#[cfg(target_os = "windows")]
const TOOLS: &[&[&str]] = &[&["clip"]];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const TOOLS: &[&[&str]] = &[
    &["wl-copy"],
    &["xclip", "-selection", "clipboard"],
    &["xsel", "--clipboard", "--input"],
];

/// Copies `text` to the system clipboard via the first tool that works.
pub fn copy(text: &str) -> Result<()> {
    for tool in TOOLS {
        if pipe_to(tool, text).is_ok() {
            return Ok(());
        }
    }
    bail!("no usable clipboard tool found")
}

fn pipe_to(command: &[&str], text: &str) -> Result<()> {
    let mut child = Command::new(command[0])
        .args(&command[1..])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to spawn {}", command[0]))?;

    child
        .stdin
        .as_mut()
        .context("clipboard tool has no stdin")?
        .write_all(text.as_bytes())?;

    let status = child.wait()?;
    if !status.success() {
        bail!("{} exited with {status}", command[0]);
    }
    Ok(())
}
