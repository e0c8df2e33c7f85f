//! CLI integration tests running full builds against scripted tools.

#![cfg(unix)]

mod build_tests;
mod common;
