//! Capabilities the enumeration core consumes from a cloud provider.
//!
//! Each resource family gets its own narrow trait with one method per page of
//! results. Collectors own the pagination loop, so every trait method returns a
//! single [`Page`] and the continuation cursor to request the next one.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

pub mod aws;
mod model;

pub use model::*;

/// One page of results plus the cursor for the following page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T, C = String> {
    pub items: Vec<T>,
    pub next: Option<C>,
}

impl<T, C> Page<T, C> {
    pub fn new(items: Vec<T>, next: Option<C>) -> Self {
        Self { items, next }
    }

    /// A page with no continuation.
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }
}

/// Authority to call provider APIs on behalf of one account.
///
/// Family accessors are cheap; clients may be built on every call.
#[async_trait]
pub trait Session: Send + Sync {
    /// Account the session is bound to, if known.
    fn account_id(&self) -> Option<&str>;

    /// Member account listing for multi-account fan-out.
    fn directory(&self) -> Box<dyn AccountDirectory>;

    /// Exchange this session's identity for a session in another account.
    async fn assume_role(&self, role_arn: &str, session_name: &str) -> Result<Arc<dyn Session>>;

    fn region_catalog(&self) -> Box<dyn RegionCatalog>;

    fn dns(&self) -> Box<dyn DnsApi>;

    fn cdn(&self) -> Box<dyn CdnApi>;

    fn accelerators(&self) -> Box<dyn AcceleratorApi>;

    fn buckets(&self) -> Box<dyn BucketApi>;

    fn load_balancers(&self, region: &str) -> Box<dyn LoadBalancerApi>;

    fn api_gateway_v1(&self, region: &str) -> Box<dyn ApiGatewayV1Api>;

    fn api_gateway_v2(&self, region: &str) -> Box<dyn ApiGatewayV2Api>;

    fn compute(&self, region: &str) -> Box<dyn ComputeApi>;

    fn certificates(&self, region: &str) -> Box<dyn CertificateApi>;
}

#[async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn list_accounts(&self, next: Option<String>) -> Result<Page<Account>>;
}

#[async_trait]
pub trait RegionCatalog: Send + Sync {
    /// Every region of the partition, enabled or not.
    async fn describe_regions(&self) -> Result<Vec<RegionInfo>>;
}

#[async_trait]
pub trait DnsApi: Send + Sync {
    async fn list_hosted_zones(&self, next: Option<String>) -> Result<Page<HostedZone>>;

    async fn list_record_sets(
        &self,
        zone_id: &str,
        next: Option<RecordCursor>,
    ) -> Result<Page<RecordSet, RecordCursor>>;
}

#[async_trait]
pub trait LoadBalancerApi: Send + Sync {
    async fn list_load_balancers(&self, next: Option<String>) -> Result<Page<LoadBalancer>>;

    async fn tags(&self, arn: &str) -> Result<Vec<(String, String)>>;
}

#[async_trait]
pub trait ApiGatewayV1Api: Send + Sync {
    async fn list_domain_names(&self, next: Option<String>) -> Result<Page<ApiDomain>>;
}

#[async_trait]
pub trait ApiGatewayV2Api: Send + Sync {
    async fn list_domain_names(&self, next: Option<String>) -> Result<Page<ApiDomain>>;
}

#[async_trait]
pub trait CdnApi: Send + Sync {
    async fn list_distributions(&self, next: Option<String>) -> Result<Page<Distribution>>;
}

#[async_trait]
pub trait AcceleratorApi: Send + Sync {
    async fn list_accelerators(&self, next: Option<String>) -> Result<Page<Accelerator>>;
}

#[async_trait]
pub trait BucketApi: Send + Sync {
    async fn list_buckets(&self, next: Option<String>) -> Result<Page<Bucket>>;

    /// Raw location constraint; `None` or empty for the partition default region.
    async fn bucket_location(&self, bucket: &str) -> Result<Option<String>>;

    /// Whether website hosting is configured. A missing configuration is `Ok(false)`.
    async fn has_website(&self, bucket: &str, region: &str) -> Result<bool>;
}

#[async_trait]
pub trait ComputeApi: Send + Sync {
    async fn list_running_instances(&self, next: Option<String>) -> Result<Page<Instance>>;

    async fn list_elastic_ips(&self) -> Result<Vec<ElasticIp>>;
}

#[async_trait]
pub trait CertificateApi: Send + Sync {
    async fn list_issued_certificates(&self, next: Option<String>) -> Result<Page<Certificate>>;
}
