use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;

use mileage_core::VERSION;

/// Mileage - trip and expense log for sports officials
#[derive(Parser)]
#[command(name = "mileage")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the config file
    #[arg(short, long, global = true, env = "MILEAGE_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Use ASCII symbols only
    #[arg(long, global = true)]
    pub ascii: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Arguments for the `session` command
#[derive(Args, Default)]
pub struct SessionArgs {
    /// Read commands from stdin instead of prompting
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `distance` command
#[derive(Args)]
pub struct DistanceArgs {
    /// Start location
    #[arg(value_name = "ORIGIN")]
    pub origin: String,

    /// End location
    #[arg(value_name = "DESTINATION")]
    pub destination: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `serve` command
#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:3000", value_name = "ADDR")]
    pub bind: String,
}

/// Arguments for the `doctor` command
#[derive(Args)]
pub struct DoctorArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log trips and expenses, then export them (default)
    Session(SessionArgs),

    /// Look up the driving distance between two places
    Distance(DistanceArgs),

    /// Run the OAuth token exchange endpoint
    Serve(ServeArgs),

    /// Check configuration and credentials
    Doctor(DoctorArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}
