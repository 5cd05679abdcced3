//! Command handlers for the stubsmith CLI.

pub mod capture;
pub mod generate;
pub mod info;
pub mod init;

use crate::cli::Cli;
use stubsmith_core::config::{IntrospectionSource, StubsmithConfig};
use stubsmith_core::error::{Result, StubsmithError};
use stubsmith_core::introspect::RuntimeObject;
use stubsmith_core::introspect::dump::ObjectGraph;
use tracing::{debug, error, info};

/// Loads the configuration file (explicit `--config` or discovered) and
/// applies the command-line overrides.
pub fn load_config(cli: &Cli) -> Result<StubsmithConfig> {
    let config = match &cli.config {
        Some(path) => {
            dotenv::dotenv().ok();
            StubsmithConfig::from_path(path)
        }
        None => StubsmithConfig::new(),
    };

    let mut config = match config {
        Ok(cfg) => {
            info!("Configuration loaded successfully");
            cfg
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    apply_overrides(cli, &mut config);
    Ok(config)
}

/// Command-line flags take precedence over the configuration file.
pub fn apply_overrides(cli: &Cli, config: &mut StubsmithConfig) {
    if let Some(variant) = &cli.variant {
        debug!("Variant overridden from command line: {}", variant);
        config.stubgen.variant = Some(variant.clone());
    }
    if let Some(output) = &cli.output {
        config.output.output_path = output.display().to_string();
    }
    if let Some(dump) = &cli.dump {
        config.general.source = IntrospectionSource::Dump;
        config.general.dump_path = Some(dump.display().to_string());
    }
}

/// Work to run against the root module, whichever backend provides it.
pub trait RootVisitor {
    type Output;

    fn visit<O: RuntimeObject>(self, config: &StubsmithConfig, root: &O) -> Result<Self::Output>;
}

/// Resolves the root module from the configured source and hands it to the
/// visitor.
pub fn visit_root<V: RootVisitor>(config: &StubsmithConfig, visitor: V) -> Result<V::Output> {
    match config.general.source {
        IntrospectionSource::Dump => {
            let path = config.general.dump_path.as_deref().ok_or_else(|| {
                StubsmithError::config(
                    "source = \"dump\" requires general.dump_path or --dump <PATH>",
                )
            })?;
            let graph = ObjectGraph::from_path(path)?;
            visitor.visit(config, &graph.root())
        }
        IntrospectionSource::Python => visit_python_root(config, visitor),
    }
}

#[cfg(feature = "python")]
fn visit_python_root<V: RootVisitor>(config: &StubsmithConfig, visitor: V) -> Result<V::Output> {
    use stubsmith_core::introspect::python::with_module;

    with_module(
        config.python_module(),
        config.general.activate_with.as_deref(),
        config.stubgen.variant(),
        |root| visitor.visit(config, root),
    )
}

#[cfg(not(feature = "python"))]
fn visit_python_root<V: RootVisitor>(_config: &StubsmithConfig, _visitor: V) -> Result<V::Output> {
    Err(python_unavailable())
}

#[cfg(not(feature = "python"))]
pub(crate) fn python_unavailable() -> StubsmithError {
    StubsmithError::config(
        "live introspection needs stubsmith built with `--features python`; \
         use a dump (--dump <PATH>) instead",
    )
}
