//! Generate command - walks the root module and writes one stub per module.

use super::{RootVisitor, load_config, visit_root};
use crate::cli::{Cli, GenerateArgs};
use stubsmith_core::config::StubsmithConfig;
use stubsmith_core::error::Result;
use stubsmith_core::introspect::RuntimeObject;
use stubsmith_core::stubgen::StubGenerator;
use stubsmith_core::tooling::{GenerationReport, StubWriter};
use tracing::info;

/// Runs generation with default arguments (no subcommand given).
pub fn run_default(cli: &Cli) -> Result<()> {
    run(cli, GenerateArgs::default())
}

/// Runs the generate command.
pub fn run(cli: &Cli, args: GenerateArgs) -> Result<()> {
    info!("Starting stub generation");
    let config = load_config(cli)?;

    let report = generate(&config, &args)?;
    if !args.dry_run && !args.stdout {
        info!(
            "Stub generation completed: {} modules, {} bytes written to {}",
            report.modules_written(),
            report.total_bytes(),
            config.output.output_path
        );
    }
    Ok(())
}

/// Generates the stubs described by `config`. Nothing is written for dry
/// runs or when printing to stdout, and the returned report is empty.
pub fn generate(config: &StubsmithConfig, args: &GenerateArgs) -> Result<GenerationReport> {
    visit_root(config, GenerateVisitor { args })
}

struct GenerateVisitor<'a> {
    args: &'a GenerateArgs,
}

impl RootVisitor for GenerateVisitor<'_> {
    type Output = GenerationReport;

    fn visit<O: RuntimeObject>(self, config: &StubsmithConfig, root: &O) -> Result<GenerationReport> {
        let stubs = StubGenerator::new(config.stubgen.clone()).generate(root);

        if self.args.stdout {
            for stub in &stubs {
                println!("# ---- {} ----", stub.name);
                print!("{}", stub.text);
            }
            return Ok(GenerationReport::default());
        }

        if self.args.dry_run {
            let writer = StubWriter::from_config(&config.output);
            for stub in &stubs {
                println!("{} ({} bytes) -> {}", stub.name, stub.text.len(), writer.path_for(&stub.name).display());
            }
            return Ok(GenerationReport::default());
        }

        StubWriter::from_config(&config.output).write_all(&stubs)
    }
}
