// ABOUTME: Main application orchestration for the procflow CLI
// ABOUTME: Selects the logging backend and dispatches subcommands to their implementations

use anyhow::Result;
use tracing::{debug, info_span, Span};
use tracing_subscriber::EnvFilter;

use super::commands;
use super::{Args, Commands, Config};
use crate::parser::LogConfig;

pub struct App {
    config: Config,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Effective level filter: the verbose flag, then the pipeline, then the app config.
    pub fn log_level(&self, verbose: bool, pipeline: &LogConfig) -> String {
        if verbose || pipeline.debug {
            "debug".to_string()
        } else if !pipeline.level.trim().is_empty() {
            pipeline.level().to_string()
        } else {
            self.config.logging.level.clone()
        }
    }

    /// Output format: `pretty` for debugging pipelines, else the app config's.
    pub fn log_format(&self, pipeline: &LogConfig) -> &str {
        if pipeline.debug {
            "pretty"
        } else {
            self.config.logging.format.as_str()
        }
    }

    /// Install the global subscriber and return the root span for the pipeline.
    ///
    /// A pipeline with `log.disabled` installs nothing and gets a disabled span,
    /// unless `--verbose` was passed.
    pub fn init_logging(&self, verbose: bool, no_color: bool, pipeline: &LogConfig) -> Result<Span> {
        if pipeline.disabled && !verbose {
            return Ok(Span::none());
        }

        let log_level = self.log_level(verbose, pipeline);
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

        // Child processes own stdout.
        let installed = match self.log_format(pipeline) {
            "compact" => tracing_subscriber::fmt()
                .compact()
                .with_env_filter(env_filter)
                .with_ansi(!no_color)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init(),
            "pretty" => tracing_subscriber::fmt()
                .pretty()
                .with_env_filter(env_filter)
                .with_ansi(!no_color)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init(),
            _ => tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_ansi(!no_color)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init(),
        };
        installed.map_err(|e| anyhow::anyhow!("cannot create logger: {}", e))?;

        debug!("Logging initialized with level: {}", log_level);
        Ok(info_span!("pipeline"))
    }

    /// Run the application with parsed arguments, returning the process exit code
    pub async fn run(&mut self, args: Args) -> Result<i32> {
        match args.command {
            Commands::Run { pipeline } => {
                commands::run_pipeline(pipeline, self, args.verbose, args.no_color).await
            }
            Commands::Validate { pipeline } => commands::validate_pipeline(pipeline).await,
        }
    }

    /// Create application from command line arguments
    pub fn from_args(args: &Args) -> Result<Self> {
        let config = Config::load(args.config.clone())?;
        Ok(Self::new(config))
    }
}
