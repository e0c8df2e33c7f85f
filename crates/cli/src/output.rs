//! Terminal and JSON output for build reports.
//!
//! Status lines go to stdout for progress and to stderr for problems, so
//! `--format json` output on stdout stays a single document.

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{AnsiColors, OwoColorize, Stream};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

/// Kind of a status line: picks the marker, its color and the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
  Done,
  Skipped,
  Pending,
  Info,
  Warning,
  Failed,
}

impl Status {
  pub fn marker(self) -> &'static str {
    match self {
      Status::Done => "✓",
      Status::Skipped => "=",
      Status::Pending => "·",
      Status::Info => "•",
      Status::Warning => "⚠",
      Status::Failed => "✗",
    }
  }

  fn color(self) -> AnsiColors {
    match self {
      Status::Done => AnsiColors::Green,
      Status::Skipped | Status::Pending => AnsiColors::BrightBlack,
      Status::Info => AnsiColors::Blue,
      Status::Warning => AnsiColors::Yellow,
      Status::Failed => AnsiColors::Red,
    }
  }

  fn is_problem(self) -> bool {
    matches!(self, Status::Warning | Status::Failed)
  }
}

/// Print `message` behind the status marker. Problems go to stderr.
pub fn status(kind: Status, message: &str) {
  let stream = if kind.is_problem() { Stream::Stderr } else { Stream::Stdout };
  let marker_text = kind.marker();
  let marker = marker_text.if_supports_color(stream, |m| m.color(kind.color()));
  if kind.is_problem() {
    eprintln!("{} {}", marker, message);
  } else {
    println!("{} {}", marker, message);
  }
}

/// Print an indented `label: value` line with the label padded to a column.
pub fn field(label: &str, value: &str) {
  let label = format!("{:<13}", format!("{}:", label));
  println!("  {}{}", label.if_supports_color(Stream::Stdout, |l| l.dimmed()), value);
}

/// Elapsed time as shown next to a step: `340ms`, `12.4s` or `3m07s`.
pub fn format_elapsed(elapsed: Duration) -> String {
  let millis = elapsed.as_millis();
  if millis < 1_000 {
    format!("{}ms", millis)
  } else if millis < 60_000 {
    format!("{:.1}s", elapsed.as_secs_f64())
  } else {
    let secs = elapsed.as_secs();
    format!("{}m{:02}s", secs / 60, secs % 60)
  }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
  println!("{}", json);
  Ok(())
}
