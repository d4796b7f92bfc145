// ABOUTME: Command line argument definitions and parsing using Clap
// ABOUTME: Defines the main CLI structure and subcommands for harbinger

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::output::ReportFormat;

#[derive(Parser)]
#[command(name = "harbinger")]
#[command(about = "Plans natural-language requests and executes them across worker agents")]
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
}

#[derive(Subcommand)]
pub enum Commands {
    /// Plan a request and execute it
    Run {
        #[arg(help = "What you want done, in plain language")]
        request: String,

        #[arg(short, long, help = "Write the report to this file")]
        output: Option<PathBuf>,

        #[arg(short, long, value_enum, help = "Report format [default: text, or json with --output]")]
        format: Option<ReportFormat>,
    },

    /// Generate a plan without executing it
    Plan {
        #[arg(help = "What you want done, in plain language")]
        request: String,

        #[arg(short, long, help = "Save the plan as JSON for `harbinger exec`")]
        output: Option<PathBuf>,
    },

    /// Execute a previously saved plan
    Exec {
        #[arg(help = "Path to a plan JSON file")]
        plan: PathBuf,

        #[arg(short, long, help = "Write the report to this file")]
        output: Option<PathBuf>,

        #[arg(short, long, value_enum, help = "Report format [default: text, or json with --output]")]
        format: Option<ReportFormat>,
    },

    /// Check that every configured agent is reachable
    Health,

    /// List configured agents and their actions
    Agents,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
