pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{AnalyzeArgs, CliArgs, Commands, ModelsArgs, OutputFormatArg};
pub use handlers::{
    handle_analyze, handle_models, EXIT_PIPELINE_FAILED, EXIT_STARTUP_ERROR, EXIT_SUCCESS,
};
pub use output::{ModelsReport, OutputFormat, OutputFormatter};
