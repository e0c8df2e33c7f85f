//! Shared test helpers for CLI integration tests.
//!
//! A [`TestEnv`] lays out a project checkout, a toolchain made of shell
//! scripts and a package tool that answers `add` and `path` from a table.
//! Every script appends its invocation to a shared log.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

pub const ZLIB: &str = "net.zlib.ZLibSource";
pub const QUAZIP: &str = "net.sourceforge.quazip.QuaZIPSource";
pub const INSTALLER: &str = "com.advancedinstaller.AdvancedInstallerFreeware";

/// Isolated build environment.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// Project, toolchain and package tool with every package installed.
  pub fn new() -> Self {
    let env = Self {
      temp: TempDir::new().unwrap(),
    };
    env.write_project();
    env.write_toolchain();
    env.write_package_tool(&[ZLIB, QUAZIP, INSTALLER]);
    env
  }

  fn path(&self, rel: &str) -> PathBuf {
    let p = self.temp.path().join(rel);
    std::fs::create_dir_all(&p).unwrap();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  pub fn project(&self) -> PathBuf {
    self.path("project")
  }

  pub fn toolchain(&self) -> PathBuf {
    self.path("qt")
  }

  pub fn package_tool_root(&self) -> PathBuf {
    self.path("npackd")
  }

  pub fn packages(&self) -> PathBuf {
    self.path("packages")
  }

  pub fn log(&self) -> PathBuf {
    self.temp.path().join("calls.log")
  }

  /// Logged invocations, one per line as `<tool> <args...>`.
  pub fn calls(&self) -> Vec<String> {
    std::fs::read_to_string(self.log())
      .unwrap_or_default()
      .lines()
      .map(str::to_string)
      .collect()
  }

  /// Write an executable shell script that logs itself as `name` and then runs `body`.
  pub fn write_tool(&self, path: &Path, name: &str, body: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let script = format!(
      "#!/bin/sh\necho \"{} $*\" >> '{}'\n{}\n",
      name,
      self.log().display(),
      body
    );
    std::fs::write(path, script).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
  }

  fn write_project(&self) {
    let project = self.project();
    for dir in ["wpmcpp", "npackdcl", "wpmcpp-build-desktop", "npackdcl-build-desktop"] {
      std::fs::create_dir_all(project.join(dir)).unwrap();
    }

    let zlib = self.packages().join("zlib");
    std::fs::create_dir_all(&zlib).unwrap();
    std::fs::write(zlib.join("libzdll.a"), "zlib").unwrap();
    std::fs::write(zlib.join("zlib.h"), "").unwrap();

    let quazip = self.packages().join("quazip");
    std::fs::create_dir_all(quazip.join("quazip")).unwrap();
    std::fs::write(quazip.join("quazip.pro"), "").unwrap();
  }

  fn write_toolchain(&self) {
    let root = self.toolchain();
    self.write_tool(&root.join("mingw/bin/gcc"), "gcc", "exit 0");
    self.write_tool(&root.join("mingw/bin/mingw32-make"), "make", "exit 0");
    self.write_tool(&root.join("Desktop/Qt/4.7.3/mingw/bin/qmake"), "qmake", "exit 0");
  }

  /// Package tool that reports only `installed` as present.
  pub fn write_package_tool(&self, installed: &[&str]) {
    let mut cases = String::new();
    for id in installed {
      let dir = match *id {
        ZLIB => self.packages().join("zlib"),
        QUAZIP => self.packages().join("quazip"),
        _ => self.packages().join("advinst"),
      };
      cases.push_str(&format!("    \"--package={}\") echo '{}' ;;\n", id, dir.display()));
    }
    let body = format!(
      "case \"$1\" in\n  add) exit 0 ;;\n  path)\n    case \"$2\" in\n{}    *) echo '' ;;\n    esac ;;\nesac\n",
      cases
    );
    self.write_tool(&self.package_tool_root().join("npackdcl"), "npackdcl", &body);

    let installer = self.packages().join("advinst/bin/x86/AdvancedInstaller.com");
    self.write_tool(&installer, "advinst", "exit 0");
  }

  /// Command running `npbuild <subcommand>` against this environment.
  pub fn npbuild_cmd(&self, subcommand: &str) -> Command {
    let mut cmd = cargo_bin_cmd!("npbuild");
    cmd
      .arg(subcommand)
      .arg("--project")
      .arg(self.project())
      .arg("--toolchain")
      .arg(self.toolchain())
      .env("NPACKD_CL", self.package_tool_root())
      .env_remove("NPBUILD_TOOLCHAIN")
      .env_remove("RUST_LOG");
    cmd
  }
}
