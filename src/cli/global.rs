use clap::{ArgAction, Args, Parser, Subcommand};
use tracing_core::LevelFilter;

use crate::cli::commands::{enumerate::EnumerateArgs, regions::RegionsArgs};

#[deny(missing_docs)]
#[derive(Parser, Debug)]
#[command(version = env!("CARGO_PKG_VERSION"))]
/// Surfacer - Read-only discovery of internet-facing assets across AWS accounts
pub struct CommandLineArgs {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Global arguments that apply to all subcommands
    #[command(flatten)]
    pub global_args: GlobalArgs,
}

impl CommandLineArgs {
    pub fn parse_args() -> Self {
        CommandLineArgs::parse()
    }
}

/// Top-level subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Enumerate externally reachable assets and write the inventory artifacts
    #[command(alias = "enum")]
    Enumerate(EnumerateArgs),

    /// List the regions enabled for the calling identity
    Regions(RegionsArgs),
}

/// Top-level global CLI arguments
#[derive(Args, Debug, Clone, Default)]
#[command(next_help_heading = "Global Options")]
pub struct GlobalArgs {
    /// Enable verbose output (up to 3 times for more detail)
    #[arg(global = true, long = "verbose", short = 'v', action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error messages and the run summary
    #[arg(global = true, long, short)]
    pub quiet: bool,
}

impl GlobalArgs {
    /// Level for this crate's own log targets.
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::ERROR;
        }
        match self.verbose {
            0 => LevelFilter::INFO,  // Default level if no `-v` is provided
            1 => LevelFilter::DEBUG, // `-v`
            _ => LevelFilter::TRACE, // `-vv` or more
        }
    }

    /// Whether dependency targets are logged too (`-vvv`).
    pub fn log_all_targets(&self) -> bool {
        !self.quiet && self.verbose > 2
    }
}
