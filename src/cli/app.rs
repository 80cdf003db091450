// ABOUTME: Main application orchestration for the stride CLI
// ABOUTME: Coordinates between CLI arguments, configuration, and command execution

use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::api::ApiClient;
use crate::output::Formatter;
use crate::store::Store;

use super::commands;
use super::{Args, Commands, Config, RunCommands, TemplateCommands};

pub struct App {
    config: Config,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Initialize logging based on configuration
    pub fn init_logging(&self, verbose: bool, no_color: bool) -> Result<()> {
        let log_level = if verbose {
            "debug"
        } else {
            &self.config.logging.level
        };

        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

        match self.config.logging.format.as_str() {
            "compact" => {
                tracing_subscriber::fmt()
                    .compact()
                    .with_env_filter(env_filter)
                    .with_ansi(!no_color)
                    .with_target(false)
                    .init();
            }
            _ => {
                tracing_subscriber::fmt()
                    .with_env_filter(env_filter)
                    .with_ansi(!no_color)
                    .with_target(false)
                    .init();
            }
        }

        debug!("Logging initialized with level: {}", log_level);
        Ok(())
    }

    /// Run the application with parsed arguments
    pub async fn run(&mut self, args: Args) -> Result<()> {
        self.init_logging(args.verbose, args.no_color)?;

        info!("Starting stride v{}", env!("CARGO_PKG_VERSION"));
        debug!("Configuration loaded from: {:?}", args.config);

        let client = ApiClient::new(
            &self.config.api.url,
            Duration::from_secs(self.config.api.timeout_seconds),
        )?;
        let mut store = Store::new(client);
        let formatter = Formatter::new(args.format)?;

        match args.command {
            Commands::Template { command } => match command {
                TemplateCommands::List => commands::template_list(&mut store, &formatter).await,
                TemplateCommands::Show { template } => {
                    commands::template_show(&mut store, &formatter, &template).await
                }
                TemplateCommands::Create { file } => {
                    commands::template_create(&mut store, &formatter, &file).await
                }
                TemplateCommands::Update { file } => {
                    commands::template_update(&mut store, &formatter, &file).await
                }
                TemplateCommands::Delete { template } => {
                    commands::template_delete(&mut store, &template).await
                }
                TemplateCommands::Init {
                    name,
                    output_dir,
                    kind,
                } => commands::template_init(&name, &output_dir, &kind),
                TemplateCommands::Generate { prompt, save } => {
                    commands::template_generate(&mut store, &formatter, &self.config, &prompt, save)
                        .await
                }
            },

            Commands::Run { command } => match command {
                RunCommands::Start {
                    template,
                    vars,
                    name,
                } => {
                    commands::run_start(&mut store, &formatter, &template, &vars, name.as_deref())
                        .await
                }
                RunCommands::List { search, history } => {
                    commands::run_list(&mut store, &formatter, search.as_deref(), history).await
                }
                RunCommands::Show { run } => commands::run_show(&mut store, &formatter, &run).await,
                RunCommands::Next { run } => commands::run_next(&mut store, &formatter, &run).await,
                RunCommands::Set { run, key, value } => {
                    commands::run_set(&mut store, &run, &key, &value).await
                }
                RunCommands::Add { run, label, value } => {
                    commands::run_add(&mut store, &run, &label, &value).await
                }
                RunCommands::Delete { run } => commands::run_delete(&mut store, &run).await,
            },

            Commands::Preview {
                template,
                vars,
                step,
            } => commands::preview(&mut store, &formatter, &template, &vars, step).await,
        }
    }

    /// Create application from command line arguments
    pub async fn from_args() -> Result<Self> {
        let args = Args::parse_args();
        let config = Config::load(args.config.clone())?;
        Ok(Self::new(config))
    }
}
