//! The fixed step sequence of the distribution build.
//!
//! Order: the two fetched libraries (zlib, then QuaZIP which links against
//! it), the GUI application and the command-line tool, then the installer.
//! The order is a literal list; there is no dependency graph to resolve.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::BuildConfig;
use crate::process::{EnvOverlay, Invocation, ProcessError};
use crate::resolver::Package;
use crate::step::{BuildStep, Completion, FileCopy, StepAction};
use crate::toolchain::Toolchain;

/// Installer executable inside the packager's install directory.
const PACKAGER_EXE: &str = "bin/x86/AdvancedInstaller.com";
/// Installer project descriptor, relative to the application source directory.
const INSTALLER_PROJECT: &str = "wpmcpp.aip";

#[derive(Debug, Clone)]
pub struct Pipeline {
  steps: Vec<BuildStep>,
  packages: Vec<Package>,
}

/// What `plan` shows for one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepPreview {
  pub name: String,
  pub kind: &'static str,
  pub working_dir: PathBuf,
  /// Ids of the packages the step resolves before running.
  pub needs: Vec<String>,
  /// `None` when the completion predicate could not be evaluated.
  pub complete: Option<bool>,
}

impl Pipeline {
  /// Steps in execution order, and the packages installed before any step runs.
  pub fn from_steps(steps: Vec<BuildStep>, packages: Vec<Package>) -> Self {
    Self { steps, packages }
  }

  /// The distribution build rooted at `root`.
  pub fn npackd(root: &Path, config: &BuildConfig, toolchain: &Toolchain) -> Result<Self, ProcessError> {
    let env = toolchain.overlay()?;
    let packages = &config.packages;

    let steps = vec![
      zlib_step(root, toolchain, &env, &packages.zlib),
      quazip_step(root, toolchain, &env, &packages.quazip),
      compile_step(root, toolchain, &env, "wpmcpp"),
      compile_step(root, toolchain, &env, "npackdcl"),
      installer_step(root, &packages.installer),
    ];

    Ok(Self::from_steps(
      steps,
      packages.all().into_iter().cloned().collect(),
    ))
  }

  pub fn steps(&self) -> &[BuildStep] {
    &self.steps
  }

  pub fn packages(&self) -> &[Package] {
    &self.packages
  }

  /// Evaluate every completion predicate without running anything.
  pub fn preview(&self) -> Vec<StepPreview> {
    self
      .steps
      .iter()
      .map(|step| StepPreview {
        name: step.name.clone(),
        kind: step.action.kind(),
        working_dir: step.working_dir.clone(),
        needs: step.packages().into_iter().map(|p| p.id.clone()).collect(),
        complete: step.is_complete().ok(),
      })
      .collect()
  }
}

impl StepAction {
  pub fn kind(&self) -> &'static str {
    match self {
      StepAction::FetchBuild { .. } => "fetch-build",
      StepAction::Compile { .. } => "compile",
      StepAction::Package { .. } => "package",
    }
  }
}

fn zlib_step(root: &Path, toolchain: &Toolchain, env: &EnvOverlay, package: &Package) -> BuildStep {
  let dest = root.join("zlib");
  BuildStep {
    name: "zlib".to_string(),
    working_dir: dest.clone(),
    completion: Completion::DirectoryExists(dest.clone()),
    action: StepAction::FetchBuild {
      package: package.clone(),
      dest: dest.clone(),
      prepare: Vec::new(),
      commands: vec![
        Invocation::new(toolchain.make())
          .args(["-f", "win32/Makefile.gcc"])
          .current_dir(&dest)
          .env(env.clone()),
      ],
    },
  }
}

fn quazip_step(root: &Path, toolchain: &Toolchain, env: &EnvOverlay, package: &Package) -> BuildStep {
  let dest = root.join("QuaZIP");
  let zlib = root.join("zlib");
  BuildStep {
    name: "quazip".to_string(),
    working_dir: dest.clone(),
    completion: Completion::DirectoryExists(dest.clone()),
    action: StepAction::FetchBuild {
      package: package.clone(),
      dest: dest.clone(),
      // QuaZIP links with -lz and expects the import library under this name.
      prepare: vec![FileCopy {
        from: zlib.join("libzdll.a"),
        to: zlib.join("libz.dll.a"),
      }],
      commands: vec![
        Invocation::new(toolchain.qmake())
          .arg("CONFIG+=release")
          .arg(format!("INCLUDEPATH={}", zlib.display()))
          .arg(format!("LIBS+=-L{}", zlib.display()))
          .arg(format!("LIBS+=-L{}", dest.join("quazip").join("release").display()))
          .current_dir(&dest)
          .env(env.clone()),
        Invocation::new(toolchain.make()).current_dir(&dest).env(env.clone()),
      ],
    },
  }
}

fn compile_step(root: &Path, toolchain: &Toolchain, env: &EnvOverlay, project: &str) -> BuildStep {
  let source = root.join(project);
  let build_dir = root.join(format!("{}-build-desktop", project));
  BuildStep {
    name: project.to_string(),
    working_dir: source.clone(),
    completion: Completion::Always,
    action: StepAction::Compile {
      configure: Invocation::new(toolchain.qmake())
        .arg(format!("{}.pro", project))
        .args(["-r", "-spec", toolchain.spec(), "CONFIG+=release"])
        .current_dir(&source)
        .env(env.clone()),
      build: Invocation::new(toolchain.make()).current_dir(&build_dir).env(env.clone()),
    },
  }
}

fn installer_step(root: &Path, package: &Package) -> BuildStep {
  let cwd = root.join("wpmcpp");
  BuildStep {
    name: "msi".to_string(),
    working_dir: cwd.clone(),
    completion: Completion::Always,
    action: StepAction::Package {
      tool: package.clone(),
      executable: PathBuf::from(PACKAGER_EXE),
      args: vec!["/build".to_string(), INSTALLER_PROJECT.to_string()],
      cwd,
    },
  }
}
