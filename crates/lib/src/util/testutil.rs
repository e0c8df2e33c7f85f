//! Test utilities for npbuild-lib.
//!
//! Cross-platform invocation helpers for tests that spawn real processes, and
//! [`ScriptedRunner`], a [`CommandRunner`] that answers from a table instead of
//! spawning anything.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::process::{CommandRunner, ExitOutcome, Invocation, ProcessError};

/// Invocation that echoes an environment variable through the shell.
#[cfg(unix)]
pub fn shell_echo_env(var: &str) -> Invocation {
  Invocation::new("/bin/sh").args(["-c".to_string(), format!("echo \"${}\"", var)])
}

#[cfg(windows)]
pub fn shell_echo_env(var: &str) -> Invocation {
  Invocation::new("cmd.exe").args(["/C".to_string(), format!("echo %{}%", var)])
}

/// Invocation that runs a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> Invocation {
  Invocation::new("/bin/sh").args(["-c", script])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> Invocation {
  Invocation::new("cmd.exe").args(["/C", script])
}

/// Invocation that creates an empty file in the current directory.
#[cfg(unix)]
pub fn touch_file(filename: &str) -> Invocation {
  shell_cmd(&format!("touch '{}'", filename))
}

#[cfg(windows)]
pub fn touch_file(filename: &str) -> Invocation {
  Invocation::new("powershell.exe").args([
    "-NoProfile".to_string(),
    "-Command".to_string(),
    format!("New-Item -ItemType File -Path '{}' -Force | Out-Null", filename),
  ])
}

/// Invocation that prints a message.
#[cfg(unix)]
pub fn echo_msg(msg: &str) -> Invocation {
  Invocation::new("/bin/echo").arg(msg)
}

#[cfg(windows)]
pub fn echo_msg(msg: &str) -> Invocation {
  Invocation::new("cmd.exe").args(["/C".to_string(), format!("echo {}", msg)])
}

/// A canned answer for invocations matching a program stem and argument prefix.
#[derive(Debug, Clone)]
struct Rule {
  program: String,
  args_prefix: Vec<String>,
  code: i32,
  stdout: String,
}

impl Rule {
  fn matches(&self, invocation: &Invocation) -> bool {
    invocation.program_stem() == self.program
      && invocation.args.len() >= self.args_prefix.len()
      && invocation.args.iter().zip(&self.args_prefix).all(|(a, p)| a == p)
  }
}

/// [`CommandRunner`] that records every invocation and answers from rules.
///
/// Rules are matched by program stem and argument prefix; the most recently
/// added matching rule wins. Unmatched invocations exit 0 with empty output.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
  rules: Mutex<VecDeque<Rule>>,
  calls: Mutex<Vec<Invocation>>,
}

impl ScriptedRunner {
  pub fn new() -> Self {
    Self::default()
  }

  /// Answer `program args_prefix...` with `code` and `stdout`.
  pub fn on(self, program: &str, args_prefix: &[&str], code: i32, stdout: &str) -> Self {
    self.rules.lock().unwrap().push_front(Rule {
      program: program.to_string(),
      args_prefix: args_prefix.iter().map(|s| s.to_string()).collect(),
      code,
      stdout: stdout.to_string(),
    });
    self
  }

  /// All invocations seen so far, in order.
  pub fn calls(&self) -> Vec<Invocation> {
    self.calls.lock().unwrap().clone()
  }

  /// Invocations of `program`, in order.
  pub fn calls_to(&self, program: &str) -> Vec<Invocation> {
    self
      .calls()
      .into_iter()
      .filter(|c| c.program_stem() == program)
      .collect()
  }

  fn answer(&self, invocation: &Invocation) -> (i32, String) {
    self.calls.lock().unwrap().push(invocation.clone());
    self
      .rules
      .lock()
      .unwrap()
      .iter()
      .find(|rule| rule.matches(invocation))
      .map(|rule| (rule.code, rule.stdout.clone()))
      .unwrap_or((0, String::new()))
  }
}

impl CommandRunner for ScriptedRunner {
  async fn run(&self, invocation: &Invocation) -> Result<ExitOutcome, ProcessError> {
    let (code, _) = self.answer(invocation);
    Ok(ExitOutcome::from_code(code))
  }

  async fn capture_output_line(&self, invocation: &Invocation) -> Result<String, ProcessError> {
    let (_, stdout) = self.answer(invocation);
    Ok(stdout.trim().to_string())
  }
}
