use std::path::PathBuf;

use clap::{builder::BoolishValueParser, ArgAction, Args};

use super::regions::AwsArgs;
use crate::{accounts::RoleTemplate, runner::RunOptions};

/// Enumerate externally reachable assets.
#[derive(Args, Debug, Clone)]
pub struct EnumerateArgs {
    /// Role assumed in each member account; `<member-account-id>` is replaced per account
    #[arg(long, env = "ROLE_TO_ASSUME", value_name = "ARN")]
    pub role_to_assume: Option<String>,

    /// Walk every active account of the organization
    #[arg(
        long,
        env = "ENUM_ORGS",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        default_value_t = false,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub enum_orgs: bool,

    /// Session name for assumed roles
    #[arg(long, default_value = "asi-enum")]
    pub session_name: String,

    /// Regions enumerated concurrently within one account
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u16).range(1..))]
    pub region_concurrency: u16,

    /// Global run timeout, in seconds
    #[arg(long, default_value_t = 3600, value_name = "SECONDS")]
    pub timeout: u64,

    /// Newline-delimited JSON record stream
    #[arg(long, default_value = "/tmp/asi_assets.ndjson", value_name = "PATH")]
    pub ndjson_out: PathBuf,

    /// Sorted host list
    #[arg(long, default_value = "/tmp/asi_hosts.txt", value_name = "PATH")]
    pub hosts_out: PathBuf,

    /// Two-column artifact,kind table
    #[arg(long, default_value = "/tmp/asi_summary.csv", value_name = "PATH")]
    pub summary_out: PathBuf,

    #[command(flatten)]
    pub aws: AwsArgs,
}

impl EnumerateArgs {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            multi_account: self.enum_orgs,
            role: self
                .role_to_assume
                .as_deref()
                .map(str::trim)
                .filter(|role| !role.is_empty())
                .map(RoleTemplate::new),
            session_name: self.session_name.clone(),
            region_concurrency: usize::from(self.region_concurrency),
            default_region: self.aws.default_region.clone(),
        }
    }
}
