// UI layer: terminal interaction around the workflow.
// Prompts for a token when none is configured, keeps a saved token in the
// home directory, shows a spinner during the long blocking part and prints
// the final summary. Log lines go through the spinner so they are not
// drawn over by its redraws.

use crate::patcher::PatchOutcome;
use crate::poller::PollOutcome;
use crate::workflow::WorkflowReport;
use anyhow::{Context, Result};
use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

const TOKEN_FILE: &str = ".sketchfab_token";

/// Spinner for the workflow, or a hidden bar when `enabled` is false.
/// It stays still until `start_spinner` is called.
pub fn progress(enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner
}

/// Set the message and start ticking on the spinner's own thread.
pub fn start_spinner(spinner: &ProgressBar, message: &str) {
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));
}

/// Writer that clears the spinner while a log line is written and redraws
/// it afterwards.
pub struct SuspendingWriter<W> {
    spinner: ProgressBar,
    inner: W,
}

impl<W: Write> Write for SuspendingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let inner = &mut self.inner;
        self.spinner.suspend(|| inner.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        let inner = &mut self.inner;
        self.spinner.suspend(|| inner.flush())
    }
}

/// `MakeWriter` for the tracing subscriber: stdout behind the spinner.
pub fn log_writer(
    spinner: ProgressBar,
) -> impl Fn() -> SuspendingWriter<io::Stdout> + Send + Sync + 'static {
    move || SuspendingWriter {
        spinner: spinner.clone(),
        inner: io::stdout(),
    }
}

/// Hidden prompt for the API token.
pub fn prompt_token() -> Result<String> {
    let token: String = Password::new()
        .with_prompt("Sketchfab API token")
        .interact()
        .context("Failed to read token")?;
    Ok(token.trim().to_string())
}

/// Token file in the user's home directory.
pub fn token_path() -> PathBuf {
    let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.join(TOKEN_FILE)
}

pub fn persist_token(path: &Path, token: &str) -> Result<()> {
    std::fs::write(path, token)
        .with_context(|| format!("Failed to save token to {}", path.display()))?;
    Ok(())
}

/// Saved token, if the file exists and is not blank.
pub fn load_token(path: &Path) -> Option<String> {
    let data = std::fs::read_to_string(path).ok()?;
    let token = data.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// First non-blank of: the configured token (flag, env or config file) and
/// the saved token file. Falls back to a prompt when `interactive`.
pub fn resolve_token(configured: Option<String>, interactive: bool) -> Result<Option<String>> {
    let configured = configured
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    if let Some(token) = configured {
        return Ok(Some(token));
    }
    if let Some(token) = load_token(&token_path()) {
        tracing::debug!("Using saved token");
        return Ok(Some(token));
    }
    if interactive {
        let token = prompt_token()?;
        return Ok((!token.is_empty()).then_some(token));
    }
    Ok(None)
}

pub fn summary(report: &WorkflowReport) -> Vec<String> {
    let mut lines = Vec::new();
    match &report.model_url {
        Some(url) => lines.push(format!("Uploaded: {}", url)),
        None => {
            lines.push("Upload failed".to_string());
            return lines;
        }
    }
    match &report.poll {
        Some(PollOutcome::Succeeded) => lines.push("Processing: succeeded".to_string()),
        Some(PollOutcome::Failed { reason }) => {
            lines.push(format!("Processing: failed ({})", reason))
        }
        Some(PollOutcome::Exhausted { attempts, errors }) => lines.push(format!(
            "Processing: gave up after {} attempts ({} errors)",
            attempts, errors
        )),
        None => {}
    }
    if let Some(patch) = &report.patch {
        lines.push(format!("Model patch: {}", describe(&patch.metadata)));
        lines.push(format!("Options patch: {}", describe(&patch.options)));
    }
    lines
}

pub fn print_summary(report: &WorkflowReport) {
    for line in summary(report) {
        println!("{}", line);
    }
}

fn describe(outcome: &PatchOutcome) -> String {
    match outcome {
        PatchOutcome::Applied => "applied".to_string(),
        PatchOutcome::Rejected { status, .. } => format!("rejected ({})", status),
        PatchOutcome::Error(e) => format!("error ({})", e),
    }
}
