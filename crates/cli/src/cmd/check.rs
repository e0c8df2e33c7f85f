//! Implementation of the `npbuild check` command.
//!
//! Validates the toolchain, locates the package tool and reports where each
//! package is installed. Nothing is installed or built.

use anyhow::{Context as _, Result};

use npbuild_lib::process::SystemRunner;
use npbuild_lib::resolver::Package;

use super::Context;
use crate::output::{Status, field, print_json, status};

pub fn cmd_check(ctx: &Context) -> Result<bool> {
  let runner = SystemRunner::new();
  let orchestrator = ctx.orchestrator(&runner)?;

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let result = rt.block_on(orchestrator.inspect());

  if ctx.format.is_json() {
    let packages: Vec<_> = result.as_deref().unwrap_or_default().iter().map(package_json).collect();
    print_json(&serde_json::json!({
      "toolchain": ctx.config.toolchain.root,
      "package_tool_env": ctx.config.package_tool_env,
      "ok": result.is_ok(),
      "failure": result.as_ref().err(),
      "packages": packages,
    }))?;
    return Ok(result.is_ok());
  }

  match result {
    Ok(packages) => {
      status(Status::Done, "Ready to build");
      field("Toolchain", &ctx.config.toolchain.root.display().to_string());
      field("Package tool", &format!("${}", ctx.config.package_tool_env));
      println!();
      for package in &packages {
        match package.path() {
          Some(path) => status(Status::Info, &format!("{} {} {}", package.id, package.versions, path.display())),
          None => status(Status::Pending, &format!("{} {} not installed yet", package.id, package.versions)),
        }
      }
      Ok(true)
    }
    Err(failure) => {
      status(Status::Failed, &failure.to_string());
      Ok(false)
    }
  }
}

fn package_json(package: &Package) -> serde_json::Value {
  serde_json::json!({
    "id": package.id,
    "version": package.version,
    "versions": package.versions,
    "path": package.path(),
  })
}
