//! Implementation of the `npbuild build` command.
//!
//! Installs the required packages, then runs every build step in order and
//! stops at the first failure.

use anyhow::{Context as _, Result};

use npbuild_lib::orchestrator::BuildReport;
use npbuild_lib::process::SystemRunner;
use npbuild_lib::step::StepState;

use super::Context;
use crate::output::{Status, field, format_elapsed, print_json, status};

/// Returns whether the process should exit successfully.
///
/// A missing toolchain only warns: nothing was attempted.
pub fn cmd_build(ctx: &Context) -> Result<bool> {
  // Build tools write to stdout; keep it for the JSON document.
  let runner = SystemRunner::new().child_stdout_to_stderr(ctx.format.is_json());
  let orchestrator = ctx.orchestrator(&runner)?;

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = rt.block_on(orchestrator.build());

  if ctx.format.is_json() {
    print_json(&report)?;
  } else {
    print_report(&report);
  }

  Ok(report.succeeded() || report.failure.as_ref().is_some_and(|f| !f.is_error()))
}

fn print_report(report: &BuildReport) {
  if report.attempted() > 0 {
    println!();
    for step in &report.steps {
      let line = match step.state {
        StepState::Pending => step.name.clone(),
        _ => format!("{} ({})", step.name, format_elapsed(step.elapsed)),
      };
      let kind = match step.state {
        StepState::Succeeded => Status::Done,
        StepState::Skipped => Status::Skipped,
        StepState::Failed => Status::Failed,
        StepState::Pending | StepState::Running => Status::Pending,
      };
      status(kind, &format!("  {}", line));
    }
    println!();
  }

  match &report.failure {
    None => {
      status(Status::Done, "Build complete!");
      field("Steps", &report.steps.len().to_string());
      field("Elapsed", &format_elapsed(report.elapsed));
    }
    Some(failure) if failure.is_precondition() => {
      let kind = if failure.is_error() { Status::Failed } else { Status::Warning };
      status(kind, &format!("Build not started: {}", failure));
    }
    Some(failure) => status(Status::Failed, &failure.to_string()),
  }
}
