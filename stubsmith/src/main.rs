use clap::Parser;
use stubsmith::cli::{Cli, Commands};
use stubsmith::commands;
use stubsmith_core::error::Result;
use stubsmith_core::stubsmith_log;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    stubsmith_log!("", "tracing.log");
    stubsmith_log!("", "errors.log");

    // RUST_LOG wins over -v/-q when set
    let default_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!("Parsed command line: {:?}", cli);

    let result = match &cli.command {
        Some(Commands::Generate(args)) => commands::generate::run(&cli, args.clone()),
        Some(Commands::Info(args)) => commands::info::run(&cli, args.clone()),
        Some(Commands::Init(args)) => commands::init::run(&cli, args.clone()),
        Some(Commands::Capture(args)) => commands::capture::run(&cli, args.clone()),
        None => commands::generate::run_default(&cli),
    };

    if let Err(e) = &result {
        error!("{}", e);
        stubsmith_log!(e.to_string(), "errors.log", true);
    }

    result
}
