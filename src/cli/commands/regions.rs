use std::time::Duration;

use clap::Args;

use crate::provider::aws::ApiSettings;

/// Connection settings shared by every command that talks to AWS.
#[derive(Args, Debug, Clone)]
#[command(next_help_heading = "AWS Options")]
pub struct AwsArgs {
    /// Named profile for the calling identity
    #[arg(long, env = "AWS_PROFILE", value_name = "NAME")]
    pub profile: Option<String>,

    /// Partition default region, used for global services
    #[arg(long, default_value = "us-east-1", value_name = "REGION")]
    pub default_region: String,

    /// Attempts per API call, including the first
    #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attempts: u32,

    /// Connect timeout per API call, in seconds
    #[arg(long, default_value_t = 5, value_name = "SECONDS")]
    pub connect_timeout: u64,

    /// Read timeout per API call, in seconds
    #[arg(long, default_value_t = 10, value_name = "SECONDS")]
    pub read_timeout: u64,
}

impl AwsArgs {
    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            profile: self.profile.clone(),
            default_region: self.default_region.clone(),
            max_attempts: self.max_attempts,
            connect_timeout: Duration::from_secs(self.connect_timeout),
            read_timeout: Duration::from_secs(self.read_timeout),
        }
    }
}

/// List enabled regions for the calling identity.
#[derive(Args, Debug, Clone)]
pub struct RegionsArgs {
    #[command(flatten)]
    pub aws: AwsArgs,
}
