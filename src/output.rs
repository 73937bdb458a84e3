// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes, including stage progress.

use serde::Serialize;
use std::time::{Duration, Instant};

use crate::deploy::{Stage, StageOutcome};

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only final result)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Stage reporter that prints through this output's mode.
    pub fn stage(&self) -> ConsoleStage {
        ConsoleStage { mode: self.mode }
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("{message} ({:.1}s)", elapsed);
                } else {
                    println!("{message}");
                }
            }
            OutputMode::Quiet => {
                println!("{message}");
            }
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "success",
                    message,
                    duration_secs: self.start_time.map(|_| self.elapsed_secs()),
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    println!("{json}");
                }
            }
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "error",
                    message,
                    duration_secs: self.start_time.map(|_| self.elapsed_secs()),
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    eprintln!("{json}");
                }
            }
        }
    }

    /// Print a serializable value as JSON, or each line of `text` otherwise.
    pub fn report<T: Serialize>(&self, value: &T, text: &[String]) {
        match self.mode {
            OutputMode::Json => {
                if let Ok(json) = serde_json::to_string(value) {
                    println!("{json}");
                }
            }
            OutputMode::Normal | OutputMode::Quiet => {
                for line in text {
                    println!("{line}");
                }
            }
        }
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

/// Prints stage progress to the terminal.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleStage {
    mode: OutputMode,
}

impl Stage for ConsoleStage {
    fn begin(&self, name: &str) {
        if self.mode == OutputMode::Normal {
            println!("  → {name}...");
        }
    }

    fn finish(&self, name: &str, outcome: StageOutcome<'_>, elapsed: Duration) {
        let secs = elapsed.as_secs_f64();
        match self.mode {
            OutputMode::Normal => match outcome {
                StageOutcome::Done => println!("  ✓ {name} ({secs:.1}s)"),
                StageOutcome::Skipped(reason) => println!("  ↷ {name} (skipped: {reason})"),
                StageOutcome::Failed(e) => println!("  ✗ {name} ({secs:.1}s): {e}"),
            },
            OutputMode::Quiet => {}
            OutputMode::Json => {
                let (outcome, reason) = match outcome {
                    StageOutcome::Done => ("done", None),
                    StageOutcome::Skipped(reason) => ("skipped", Some(reason.to_string())),
                    StageOutcome::Failed(e) => ("failed", Some(e.to_string())),
                };
                let event = StageEvent {
                    event: "stage",
                    name,
                    outcome,
                    reason,
                    duration_secs: secs,
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    println!("{json}");
                }
            }
        }
    }
}

#[derive(Serialize)]
struct StageEvent<'a> {
    event: &'a str,
    name: &'a str,
    outcome: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    duration_secs: f64,
}
