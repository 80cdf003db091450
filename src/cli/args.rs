// ABOUTME: Command line argument definitions and parsing using Clap
// ABOUTME: Defines the main CLI structure and subcommands for stride

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::model::Variable;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "stride")]
#[command(about = "Checklist-style workflow templates and runs for the command line")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Path to configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,

    #[arg(
        short,
        long,
        global = true,
        value_enum,
        default_value_t = OutputFormat::Text,
        help = "Output format"
    )]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage workflow templates
    Template {
        #[command(subcommand)]
        command: TemplateCommands,
    },

    /// Manage runs started from templates
    Run {
        #[command(subcommand)]
        command: RunCommands,
    },

    /// Render a template's steps with variables applied, without starting anything
    Preview {
        #[arg(help = "Template id or name")]
        template: String,

        #[arg(short = 'V', long = "var", help = "Variable overrides (key=value)")]
        vars: Vec<String>,

        #[arg(long, help = "Show a single step (1-based)")]
        step: Option<usize>,
    },
}

#[derive(Subcommand)]
pub enum TemplateCommands {
    /// List templates
    List,

    /// Show one template with its variables and steps
    Show {
        #[arg(help = "Template id or name")]
        template: String,
    },

    /// Create a template from a YAML file
    Create {
        #[arg(help = "Path to template YAML file")]
        file: PathBuf,
    },

    /// Update a template from a YAML file carrying its id
    Update {
        #[arg(help = "Path to template YAML file")]
        file: PathBuf,
    },

    /// Delete a template
    Delete {
        #[arg(help = "Template id or name")]
        template: String,
    },

    /// Write a starter template YAML file
    Init {
        #[arg(help = "Name of the template to create")]
        name: String,

        #[arg(short, long, help = "Output directory", default_value = ".")]
        output_dir: PathBuf,

        #[arg(long, help = "Starter kind: basic, webinar, or onboarding", default_value = "basic")]
        kind: String,
    },

    /// Generate a template from a prompt using the configured model
    Generate {
        #[arg(help = "What the workflow should accomplish")]
        prompt: String,

        #[arg(long, help = "Save the generated template to the backend")]
        save: bool,
    },
}

#[derive(Subcommand)]
pub enum RunCommands {
    /// Start a run of a template
    Start {
        #[arg(help = "Template id or name")]
        template: String,

        #[arg(short = 'V', long = "var", help = "Variable overrides (key=value)")]
        vars: Vec<String>,

        #[arg(long, help = "Run name, defaults to the template name")]
        name: Option<String>,
    },

    /// List runs, latest per template by default
    List {
        #[arg(long, help = "Filter by template name")]
        search: Option<String>,

        #[arg(long, help = "Show every run instead of the latest per template")]
        history: bool,
    },

    /// Show one run with its rendered current step
    Show {
        #[arg(help = "Run id or unique id prefix")]
        run: String,
    },

    /// Complete the current step and advance
    Next {
        #[arg(help = "Run id or unique id prefix")]
        run: String,
    },

    /// Set a run variable
    Set {
        #[arg(help = "Run id or unique id prefix")]
        run: String,

        #[arg(help = "Variable key")]
        key: String,

        #[arg(help = "New value")]
        value: String,
    },

    /// Add a variable to a run
    Add {
        #[arg(help = "Run id or unique id prefix")]
        run: String,

        #[arg(help = "Variable label, the key is derived from it")]
        label: String,

        #[arg(help = "Initial value", default_value = "")]
        value: String,
    },

    /// Delete a run
    Delete {
        #[arg(help = "Run id or unique id prefix")]
        run: String,
    },
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parse variables from key=value format. Labels default to the
    /// key; declared template variables keep their own labels when the
    /// override is merged.
    pub fn parse_variables(vars: &[String]) -> anyhow::Result<Vec<Variable>> {
        let mut variables: Vec<Variable> = Vec::new();

        for var in vars {
            if let Some((key, value)) = var.split_once('=') {
                match variables.iter_mut().find(|v| v.key == key) {
                    Some(existing) => existing.value = value.to_string(),
                    None => variables.push(Variable::new(key, key).with_value(value)),
                }
            } else {
                return Err(anyhow::anyhow!(
                    "Invalid variable format '{}'. Expected 'key=value'",
                    var
                ));
            }
        }

        Ok(variables)
    }
}
