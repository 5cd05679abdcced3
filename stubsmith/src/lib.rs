pub use stubsmith_core::{config, error, introspect, stubgen, tooling};

pub mod cli;
pub mod commands;
