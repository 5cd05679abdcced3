//! File output for generated stubs.
//!
//! ```rust,ignore
//! let config = StubsmithConfig::new()?;
//! let graph = ObjectGraph::from_path("introspection.json")?;
//! let report = stubsmith_core::tooling::generate_with_config(&config, &graph.root())?;
//! println!("{} stubs written", report.files.len());
//! ```

mod generator;

pub use generator::*;

use crate::config::StubsmithConfig;
use crate::error::StubsmithError;
use crate::introspect::RuntimeObject;
use crate::stubgen::StubGenerator;

/// Generates and writes the stubs of `root` and all of its submodules.
///
/// # Errors
///
/// Returns `StubsmithError` if the output directory cannot be created or a
/// stub cannot be written.
pub fn generate_with_config<O: RuntimeObject>(
    config: &StubsmithConfig,
    root: &O,
) -> Result<GenerationReport, StubsmithError> {
    let stubs = StubGenerator::new(config.stubgen.clone()).generate(root);
    StubWriter::from_config(&config.output).write_all(&stubs)
}
