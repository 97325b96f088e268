use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Multi-phase LLM analysis that generates .cursorrules for a codebase
#[derive(Parser, Debug)]
#[command(
    name = "rules-architect",
    about = "Analyze a codebase with a multi-phase LLM pipeline and generate .cursorrules",
    version,
    author,
    long_about = "rules-architect walks a project through six LLM phases: discovery, planning, \
                  deep analysis by dynamically planned agents, synthesis, consolidation and \
                  rule generation. Each phase writes a Markdown report under phases_output/, \
                  and the final phase produces the .cursorrules file."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Verbose output (debug logging)")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Analyze a project and generate .cursorrules",
        long_about = "Runs the full pipeline over a project directory.\n\n\
                      Examples:\n  \
                      rules-architect analyze .\n  \
                      rules-architect analyze ~/src/app --output-dir /tmp/app-rules\n  \
                      rules-architect analyze . --exclude docs,*.csv --timeout 120"
    )]
    Analyze(AnalyzeArgs),

    #[command(
        about = "Show the model used by each phase",
        long_about = "Prints the effective per-phase model table after applying the config \
                      file and environment overrides, with credential status per provider.\n\n\
                      Examples:\n  \
                      rules-architect models\n  \
                      rules-architect models --format json"
    )]
    Models(ModelsArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    #[arg(value_name = "PATH", help = "Path to the project to analyze")]
    pub path: PathBuf,

    #[arg(
        short = 'o',
        long,
        value_name = "DIR",
        help = "Where .cursorrules and phases_output/ are written (defaults to PATH)"
    )]
    pub output_dir: Option<PathBuf>,

    #[arg(
        short = 'e',
        long,
        value_name = "LIST",
        help = "Comma-separated names to exclude in addition to the defaults (e.g. docs,*.csv)"
    )]
    pub exclude: Option<String>,

    #[arg(long, value_name = "FILE", help = "TOML file with per-phase model overrides")]
    pub config: Option<PathBuf>,

    #[arg(long, overrides_with = "no_enhance", help = "Run the rule-enhancement pass")]
    pub enhance: bool,

    #[arg(long, overrides_with = "enhance", help = "Skip the rule-enhancement pass")]
    pub no_enhance: bool,

    #[arg(long, value_name = "SECONDS", help = "Per-call LLM timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long, value_name = "N", help = "Depth of the rendered project tree")]
    pub max_depth: Option<usize>,
}

impl AnalyzeArgs {
    pub fn enhance_enabled(&self) -> bool {
        self.enhance && !self.no_enhance
    }
}

#[derive(Parser, Debug, Clone)]
pub struct ModelsArgs {
    #[arg(long, value_name = "FILE", help = "TOML file with per-phase model overrides")]
    pub config: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_default_analyze_args() {
        let args = CliArgs::parse_from(["rules-architect", "analyze", "/tmp/project"]);
        match args.command {
            Commands::Analyze(analyze) => {
                assert_eq!(analyze.path, PathBuf::from("/tmp/project"));
                assert!(analyze.output_dir.is_none());
                assert!(analyze.exclude.is_none());
                assert!(analyze.timeout.is_none());
                assert!(!analyze.enhance_enabled());
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_analyze_with_options() {
        let args = CliArgs::parse_from([
            "rules-architect",
            "analyze",
            ".",
            "-o",
            "/tmp/out",
            "-e",
            "docs,*.csv",
            "--config",
            "models.toml",
            "--enhance",
            "--timeout",
            "90",
            "--max-depth",
            "3",
        ]);

        match args.command {
            Commands::Analyze(analyze) => {
                assert_eq!(analyze.output_dir, Some(PathBuf::from("/tmp/out")));
                assert_eq!(analyze.exclude.as_deref(), Some("docs,*.csv"));
                assert_eq!(analyze.config, Some(PathBuf::from("models.toml")));
                assert!(analyze.enhance_enabled());
                assert_eq!(analyze.timeout, Some(90));
                assert_eq!(analyze.max_depth, Some(3));
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_last_enhance_flag_wins() {
        let args = CliArgs::parse_from(["rules-architect", "analyze", ".", "--enhance", "--no-enhance"]);
        match args.command {
            Commands::Analyze(analyze) => assert!(!analyze.enhance_enabled()),
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_analyze_requires_path() {
        assert!(CliArgs::try_parse_from(["rules-architect", "analyze"]).is_err());
    }

    #[test]
    fn test_models_command() {
        let args = CliArgs::parse_from(["rules-architect", "models", "--format", "yaml"]);
        match args.command {
            Commands::Models(models) => {
                assert_eq!(models.format, OutputFormatArg::Yaml);
                assert!(models.config.is_none());
            }
            _ => panic!("Expected Models command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let args = CliArgs::parse_from(["rules-architect", "-v", "models"]);
        assert!(args.verbose);
        assert!(!args.quiet);

        let args = CliArgs::parse_from(["rules-architect", "models", "-q"]);
        assert!(args.quiet);

        let args = CliArgs::parse_from(["rules-architect", "--log-level", "debug", "models"]);
        assert_eq!(args.log_level, Some("debug".to_string()));

        assert!(CliArgs::try_parse_from(["rules-architect", "-v", "-q", "models"]).is_err());
    }
}
