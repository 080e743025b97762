//! AWS SDK implementation of the provider capabilities.

use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use aws_config::{
    meta::region::RegionProviderChain, retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion,
    SdkConfig,
};
use aws_credential_types::{provider::SharedCredentialsProvider, Credentials};
use aws_types::region::Region;
use tracing::{debug, info};

use super::{
    AcceleratorApi, AccountDirectory, ApiGatewayV1Api, ApiGatewayV2Api, BucketApi, CdnApi,
    CertificateApi, ComputeApi, DnsApi, LoadBalancerApi, RegionCatalog, Session,
};

mod accelerator;
mod acm;
mod apigateway;
mod cloudfront;
mod ec2;
mod elb;
mod organizations;
mod route53;
mod s3;

/// Global Accelerator's control plane only lives in this region.
const ACCELERATOR_REGION: &str = "us-west-2";

/// Client-side bounds applied to every SDK call.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Named profile for the seed identity.
    pub profile: Option<String>,
    /// Partition default region, used for global services.
    pub default_region: String,
    pub max_attempts: u32,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            profile: None,
            default_region: "us-east-1".into(),
            max_attempts: 6,
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
        }
    }
}

impl ApiSettings {
    fn retry_config(&self) -> RetryConfig {
        RetryConfig::standard().with_max_attempts(self.max_attempts.max(1))
    }

    fn timeout_config(&self) -> TimeoutConfig {
        TimeoutConfig::builder()
            .connect_timeout(self.connect_timeout)
            .read_timeout(self.read_timeout)
            .build()
    }
}

/// Resolves the caller's ambient identity into the seed session.
///
/// Fails when no usable credentials are found, since nothing can be
/// enumerated without them.
pub async fn load_seed_session(settings: &ApiSettings) -> Result<Arc<dyn Session>> {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .retry_config(settings.retry_config())
        .timeout_config(settings.timeout_config());

    if let Some(profile) = &settings.profile {
        loader = loader.profile_name(profile);
    }

    let region_provider = RegionProviderChain::default_provider()
        .or_else(Region::new(settings.default_region.clone()));
    let config = loader.region(region_provider).load().await;

    let session = AwsSession::new(config, settings.clone());
    let sts = aws_sdk_sts::Client::new(&session.global());
    let caller =
        sts.get_caller_identity().send().await.context("Failed to call sts:GetCallerIdentity")?;
    let arn = caller.arn().unwrap_or("unknown");
    info!("Seed identity: {arn}");

    Ok(Arc::new(AwsSession { account_id: caller.account().map(str::to_string), ..session }))
}

/// One account's credentials plus the shared client settings.
pub struct AwsSession {
    config: SdkConfig,
    settings: ApiSettings,
    account_id: Option<String>,
}

impl AwsSession {
    fn new(config: SdkConfig, settings: ApiSettings) -> Self {
        Self { config, settings, account_id: None }
    }

    fn regional(&self, region: &str) -> SdkConfig {
        self.config.to_builder().region(Region::new(region.to_string())).build()
    }

    fn global(&self) -> SdkConfig {
        self.regional(&self.settings.default_region)
    }
}

#[async_trait]
impl Session for AwsSession {
    fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    fn directory(&self) -> Box<dyn AccountDirectory> {
        Box::new(organizations::OrganizationsDirectory::new(&self.global()))
    }

    async fn assume_role(&self, role_arn: &str, session_name: &str) -> Result<Arc<dyn Session>> {
        let sts = aws_sdk_sts::Client::new(&self.global());
        let resp = sts
            .assume_role()
            .role_arn(role_arn)
            .role_session_name(session_name)
            .send()
            .await
            .with_context(|| format!("sts:AssumeRole failed for {role_arn}"))?;

        let creds = resp
            .credentials()
            .ok_or_else(|| anyhow!("sts:AssumeRole returned no credentials for {role_arn}"))?;
        let credentials = Credentials::new(
            creds.access_key_id(),
            creds.secret_access_key(),
            Some(creds.session_token().to_string()),
            None,
            "assume_role",
        );

        let account_id = resp
            .assumed_role_user()
            .and_then(|user| account_from_arn(user.arn()))
            .or_else(|| account_from_arn(role_arn));
        debug!("Assumed {role_arn} (account {})", account_id.as_deref().unwrap_or("unknown"));

        let config = self
            .config
            .to_builder()
            .credentials_provider(SharedCredentialsProvider::new(credentials))
            .build();

        Ok(Arc::new(AwsSession { config, settings: self.settings.clone(), account_id }))
    }

    fn region_catalog(&self) -> Box<dyn RegionCatalog> {
        Box::new(ec2::Ec2Compute::new(&self.global()))
    }

    fn dns(&self) -> Box<dyn DnsApi> {
        Box::new(route53::Route53Dns::new(&self.global()))
    }

    fn cdn(&self) -> Box<dyn CdnApi> {
        Box::new(cloudfront::CloudFrontCdn::new(&self.global()))
    }

    fn accelerators(&self) -> Box<dyn AcceleratorApi> {
        Box::new(accelerator::GlobalAccelerators::new(&self.regional(ACCELERATOR_REGION)))
    }

    fn buckets(&self) -> Box<dyn BucketApi> {
        Box::new(s3::S3Buckets::new(&self.global()))
    }

    fn load_balancers(&self, region: &str) -> Box<dyn LoadBalancerApi> {
        Box::new(elb::ElbV2::new(&self.regional(region)))
    }

    fn api_gateway_v1(&self, region: &str) -> Box<dyn ApiGatewayV1Api> {
        Box::new(apigateway::RestApiDomains::new(&self.regional(region)))
    }

    fn api_gateway_v2(&self, region: &str) -> Box<dyn ApiGatewayV2Api> {
        Box::new(apigateway::HttpApiDomains::new(&self.regional(region)))
    }

    fn compute(&self, region: &str) -> Box<dyn ComputeApi> {
        Box::new(ec2::Ec2Compute::new(&self.regional(region)))
    }

    fn certificates(&self, region: &str) -> Box<dyn CertificateApi> {
        Box::new(acm::AcmCertificates::new(&self.regional(region)))
    }
}

/// Account id field of an ARN (`arn:partition:service:region:account:resource`).
fn account_from_arn(arn: &str) -> Option<String> {
    arn.split(':').nth(4).filter(|id| !id.is_empty()).map(str::to_string)
}

/// Continuation tokens come back empty instead of absent from some services.
fn cursor(token: Option<&str>) -> Option<String> {
    token.filter(|t| !t.is_empty()).map(str::to_string)
}
