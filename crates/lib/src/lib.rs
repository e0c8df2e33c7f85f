//! npbuild-lib: build orchestration for the Npackd distribution
//!
//! The pipeline fetches and builds two libraries, compiles the GUI
//! application and the command-line tool, then produces the installer:
//! - `Toolchain`: the fixed compiler installation the builds run with
//! - `PackageResolver`: installs packages and resolves their locations through the package tool
//! - `BuildStep`: one step, its completion predicate and its action
//! - `Pipeline`: the ordered steps and the packages they need
//! - `Orchestrator`: runs a pipeline fail-fast and reports what happened

pub mod config;
pub mod consts;
pub mod guard;
pub mod orchestrator;
pub mod pipeline;
pub mod process;
pub mod resolver;
pub mod step;
pub mod toolchain;
pub mod util;
