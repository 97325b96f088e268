use rules_architect::cli::commands::{CliArgs, Commands};
use rules_architect::cli::handlers::{handle_analyze, handle_models};
use rules_architect::util::logging::{config_from_env, init_logging, parse_level};
use rules_architect::VERSION;

use clap::Parser;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("rules-architect v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Analyze(analyze_args) => handle_analyze(analyze_args, args.quiet).await,
        Commands::Models(models_args) => handle_models(models_args).await,
    };

    std::process::exit(exit_code);
}

/// `--log-level` wins over `-v`/`-q`, which win over the environment
fn init_logging_from_args(args: &CliArgs) {
    let level_override = if let Some(level_str) = &args.log_level {
        Some(parse_level(level_str))
    } else if args.verbose {
        Some(Level::DEBUG)
    } else if args.quiet {
        Some(Level::ERROR)
    } else {
        None
    };

    init_logging(config_from_env(level_override));
}
