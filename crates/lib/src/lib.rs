//! zipship-lib: build orchestration for Python source trees.
//!
//! This crate provides the pieces behind the `zipship` CLI:
//! - `config`: layered project configuration (defaults, `zipship.toml`, env, flags)
//! - `clean`: removal of build output, CI scratch, bytecode caches and coverage data
//! - `package`: packaging a source directory into a self-executing zip archive
//! - `runner`: invoking the external test-suite runner
//! - `task`: the task graph, plan expansion and sequential execution

pub mod clean;
pub mod config;
pub mod consts;
pub mod package;
pub mod runner;
pub mod task;
pub mod util;
