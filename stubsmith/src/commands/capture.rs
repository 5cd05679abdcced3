//! Capture command - snapshots a live module into an introspection dump.

use crate::cli::{CaptureArgs, Cli};
use stubsmith_core::error::Result;

#[cfg(feature = "python")]
use {
    super::load_config,
    stubsmith_core::error::StubsmithError,
    stubsmith_core::introspect::dump::ObjectGraph,
    stubsmith_core::introspect::python::with_module,
    std::fs,
    tracing::info,
};

#[cfg(feature = "python")]
const DEFAULT_DUMP_PATH: &str = "introspection.json";

/// Runs the capture command.
#[cfg(feature = "python")]
pub fn run(cli: &Cli, args: CaptureArgs) -> Result<()> {
    let config = load_config(cli)?;
    let module = args
        .module
        .clone()
        .unwrap_or_else(|| config.python_module().to_string());
    // --dump names the file to write; the configured dump path is the fallback
    let destination = cli
        .dump
        .as_ref()
        .map(|p| p.display().to_string())
        .or_else(|| config.general.dump_path.clone())
        .unwrap_or_else(|| DEFAULT_DUMP_PATH.to_string());

    let graph = with_module(
        &module,
        config.general.activate_with.as_deref(),
        config.stubgen.variant(),
        |root| Ok(ObjectGraph::capture(root, &config.stubgen.excluded_modules)),
    )?;

    let json = graph.to_json()?;
    fs::write(&destination, &json).map_err(|e| {
        StubsmithError::introspection(format!("failed to write {}: {}", destination, e))
    })?;
    info!(
        module = %module,
        objects = graph.objects.len(),
        "Introspection dump written to {}",
        destination
    );
    Ok(())
}

/// Runs the capture command.
#[cfg(not(feature = "python"))]
pub fn run(_cli: &Cli, args: CaptureArgs) -> Result<()> {
    tracing::error!(
        "Cannot capture {}: {}",
        args.module.as_deref().unwrap_or("the configured module"),
        super::python_unavailable()
    );
    Err(super::python_unavailable())
}
