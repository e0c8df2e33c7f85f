//! Implementation of the `npbuild plan` command.
//!
//! Lists the build steps in execution order and whether each one would be
//! skipped. Nothing is installed or run.

use anyhow::Result;
use serde::Serialize;

use npbuild_lib::pipeline::StepPreview;
use npbuild_lib::resolver::Package;

use super::Context;
use crate::output::{Status, field, print_json, status};

#[derive(Serialize)]
struct PlanOutput<'a> {
  project: &'a std::path::Path,
  toolchain: &'a std::path::Path,
  packages: &'a [Package],
  steps: Vec<StepPreview>,
}

pub fn cmd_plan(ctx: &Context, verbose: bool) -> Result<bool> {
  let pipeline = ctx.pipeline()?;
  let steps = pipeline.preview();

  if ctx.format.is_json() {
    print_json(&PlanOutput {
      project: &ctx.project,
      toolchain: &ctx.config.toolchain.root,
      packages: pipeline.packages(),
      steps,
    })?;
    return Ok(true);
  }

  field("Project", &ctx.project.display().to_string());
  field("Toolchain", &ctx.config.toolchain.root.display().to_string());
  field("Steps", &steps.len().to_string());
  println!();

  for step in &steps {
    let (kind, verdict) = match step.complete {
      Some(true) => (Status::Skipped, "skip"),
      Some(false) => (Status::Pending, "run"),
      None => (Status::Warning, "unknown"),
    };
    let line = format!("{:<10} {:<12} {}", step.name, step.kind, verdict);
    if kind == Status::Warning {
      // Keep the listing on stdout; the summary below goes to stderr.
      println!("{} {}", kind.marker(), line);
    } else {
      status(kind, &line);
    }
    if verbose {
      field("  dir", &step.working_dir.display().to_string());
      if !step.needs.is_empty() {
        field("  needs", &step.needs.join(", "));
      }
    }
  }

  if verbose {
    println!();
    println!("Packages:");
    for package in pipeline.packages() {
      status(Status::Info, &format!("{} {} {}", package.id, package.version, package.versions));
    }
  }

  if steps.iter().any(|s| s.complete.is_none()) {
    status(Status::Warning, "Some steps could not be checked");
  }

  Ok(true)
}
