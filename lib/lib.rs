//! This library crate turns a fully resolved meta-build graph into a tree of
//! Ninja build files.
//!
//! # Model
//!
//! The front-end hands over a [`BuildGraph`](graph::BuildGraph): targets,
//! toolchains with their [tools](tool), and per-target config values, all
//! immutable during emission. The emission core consists of:
//!
//! - **The substitution engine**
//!
//!   The [`substitution`] module holds the `{{placeholder}}` vocabulary,
//!   the parsed pattern and list types tool templates are made of, and the
//!   expansion into concrete strings, file names and Ninja rule text.
//!
//! - **Per-target writers**
//!
//!   The [`ninja`] module translates each target into one Ninja fragment:
//!   compile edges, precompiled-header edges, Clang module edges, Swift
//!   module edges, Rust crate edges, action rules and link or stamp edges.
//!
//! - **The scheduler**
//!
//!   The [`scheduler`] module runs one writer task per target on a worker
//!   pool, serializes logging and failure reporting through a main-thread
//!   message loop, and tracks the registries consumed by the validation
//!   passes.
//!
//! # Utilities
//!
//! [`escape`] and [`path_output`] implement the three escaping contexts
//! Ninja text is written into; [`resolved`] memoizes the transitive data
//! (libraries, frameworks, Swift modules, inherited Rust libraries) writers
//! pull from the dependency tree.

pub mod error;
pub mod escape;
pub mod graph;
pub mod label;
pub mod ninja;
pub mod output_file;
pub mod path_output;
pub mod path_util;
pub mod resolved;
pub mod scheduler;
pub mod source_file;
pub mod substitution;
pub mod target;
pub mod tool;
pub mod toolchain;
