//! RLD - a static analyzer for infinite re-render loops and reactivity bugs
//! in component-and-hooks UI code.
//!
//! RLD inspects parsed source trees, derives a semantic model of reactive
//! state (state/setter pairs, refs, memoized values), and detects a fixed
//! taxonomy of anti-patterns: effects that mutate their own dependency,
//! setters invoked during the render phase, dependencies whose identity is
//! recreated on every render, and setters reached indirectly through
//! imported helper functions.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (argument parsing, commands, report)
//! - `config`: Configuration file loading and parsing
//! - `core`: Core analysis engine (the multi-pass pipeline)
//! - `issues`: Diagnostic record and the closed error-code taxonomy
//! - `rules`: Auxiliary detectors that run alongside the main pipeline
//! - `utils`: Shared utility functions

pub mod cli;
pub mod config;
pub mod core;
pub mod issues;
pub mod rules;
pub mod utils;
