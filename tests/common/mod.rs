//! In-process fake cloud implementing every provider capability.
#![allow(dead_code)]

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use surfacer::provider::*;

/// Resources visible to one account.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    pub zones: Vec<(HostedZone, Vec<RecordSet>)>,
    pub distributions: Vec<Distribution>,
    pub accelerators: Vec<Accelerator>,
    /// `(bucket, location, website)`
    pub buckets: Vec<(String, Option<String>, bool)>,
    pub regions: Vec<RegionInfo>,
    pub load_balancers: BTreeMap<String, Vec<LoadBalancer>>,
    pub lb_tags_fail: bool,
    pub apigw_v1: BTreeMap<String, Vec<String>>,
    pub apigw_v2: BTreeMap<String, Vec<String>>,
    pub instances: BTreeMap<String, Vec<Instance>>,
    pub elastic_ips: BTreeMap<String, Vec<ElasticIp>>,
    pub certificates: BTreeMap<String, Vec<Certificate>>,
    /// Capabilities that answer with an error: `dns`, `cdn`, `accelerators`,
    /// `buckets`, `regions`, `load_balancers`, `apigw_v1`, `apigw_v2`,
    /// `instances`, `elastic_ips`, `certificates`.
    pub failing: BTreeSet<&'static str>,
    /// Capabilities that never answer.
    pub stalled: BTreeSet<&'static str>,
}

impl Inventory {
    pub fn with_regions(mut self, regions: &[(&str, &str)]) -> Self {
        self.regions = regions
            .iter()
            .map(|(name, status)| RegionInfo { name: name.to_string(), opt_in_status: status.to_string() })
            .collect();
        self
    }

    pub fn failing(mut self, capability: &'static str) -> Self {
        self.failing.insert(capability);
        self
    }

    pub fn stalled(mut self, capability: &'static str) -> Self {
        self.stalled.insert(capability);
        self
    }

    async fn check(&self, capability: &str) -> Result<()> {
        if self.stalled.contains(capability) {
            std::future::pending::<()>().await;
        }
        if self.failing.contains(capability) {
            bail!("AccessDenied: {capability} is not authorized");
        }
        Ok(())
    }
}

pub struct FakeCloud {
    pub seed_account: String,
    pub directory: Vec<Account>,
    pub inventories: BTreeMap<String, Inventory>,
    pub denied_roles: BTreeSet<String>,
    pub assumed: Mutex<Vec<String>>,
}

impl FakeCloud {
    pub fn single(account: &str, inventory: Inventory) -> Arc<Self> {
        Arc::new(Self {
            seed_account: account.to_string(),
            directory: Vec::new(),
            inventories: BTreeMap::from([(account.to_string(), inventory)]),
            denied_roles: BTreeSet::new(),
            assumed: Mutex::new(Vec::new()),
        })
    }

    pub fn seed(self: &Arc<Self>) -> Arc<dyn Session> {
        Arc::new(FakeSession { cloud: self.clone(), account: self.seed_account.clone() })
    }

    pub fn assumed_roles(&self) -> Vec<String> {
        self.assumed.lock().clone()
    }

    fn inventory(&self, account: &str) -> Inventory {
        self.inventories.get(account).cloned().unwrap_or_default()
    }
}

pub struct FakeSession {
    cloud: Arc<FakeCloud>,
    account: String,
}

impl FakeSession {
    fn scoped(&self, region: &str) -> Box<Scoped> {
        Box::new(Scoped { inventory: self.cloud.inventory(&self.account), region: region.to_string() })
    }
}

#[async_trait]
impl Session for FakeSession {
    fn account_id(&self) -> Option<&str> {
        Some(&self.account)
    }

    fn directory(&self) -> Box<dyn AccountDirectory> {
        Box::new(Directory(self.cloud.directory.clone()))
    }

    async fn assume_role(&self, role_arn: &str, _session_name: &str) -> Result<Arc<dyn Session>> {
        self.cloud.assumed.lock().push(role_arn.to_string());
        if self.cloud.denied_roles.contains(role_arn) {
            bail!("AccessDenied: not authorized to perform sts:AssumeRole on {role_arn}");
        }
        let account = role_arn
            .split(':')
            .nth(4)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| anyhow!("malformed role {role_arn}"))?;
        Ok(Arc::new(FakeSession { cloud: self.cloud.clone(), account: account.to_string() }))
    }

    fn region_catalog(&self) -> Box<dyn RegionCatalog> {
        self.scoped("global")
    }

    fn dns(&self) -> Box<dyn DnsApi> {
        self.scoped("global")
    }

    fn cdn(&self) -> Box<dyn CdnApi> {
        self.scoped("global")
    }

    fn accelerators(&self) -> Box<dyn AcceleratorApi> {
        self.scoped("us-west-2")
    }

    fn buckets(&self) -> Box<dyn BucketApi> {
        self.scoped("global")
    }

    fn load_balancers(&self, region: &str) -> Box<dyn LoadBalancerApi> {
        self.scoped(region)
    }

    fn api_gateway_v1(&self, region: &str) -> Box<dyn ApiGatewayV1Api> {
        self.scoped(region)
    }

    fn api_gateway_v2(&self, region: &str) -> Box<dyn ApiGatewayV2Api> {
        self.scoped(region)
    }

    fn compute(&self, region: &str) -> Box<dyn ComputeApi> {
        self.scoped(region)
    }

    fn certificates(&self, region: &str) -> Box<dyn CertificateApi> {
        self.scoped(region)
    }
}

/// Serves one account per page.
struct Directory(Vec<Account>);

#[async_trait]
impl AccountDirectory for Directory {
    async fn list_accounts(&self, next: Option<String>) -> Result<Page<Account>> {
        let index: usize = next.map(|n| n.parse()).transpose()?.unwrap_or(0);
        let items = self.0.get(index).cloned().into_iter().collect();
        let next = (index + 1 < self.0.len()).then(|| (index + 1).to_string());
        Ok(Page::new(items, next))
    }
}

struct Scoped {
    inventory: Inventory,
    region: String,
}

impl Scoped {
    fn regional<T: Clone>(&self, map: &BTreeMap<String, Vec<T>>) -> Vec<T> {
        map.get(&self.region).cloned().unwrap_or_default()
    }

    fn domains(&self, map: &BTreeMap<String, Vec<String>>) -> Page<ApiDomain> {
        Page::last(self.regional(map).into_iter().map(|domain_name| ApiDomain { domain_name }).collect())
    }
}

#[async_trait]
impl RegionCatalog for Scoped {
    async fn describe_regions(&self) -> Result<Vec<RegionInfo>> {
        self.inventory.check("regions").await?;
        Ok(self.inventory.regions.clone())
    }
}

#[async_trait]
impl DnsApi for Scoped {
    async fn list_hosted_zones(&self, _: Option<String>) -> Result<Page<HostedZone>> {
        self.inventory.check("dns").await?;
        Ok(Page::last(self.inventory.zones.iter().map(|(zone, _)| zone.clone()).collect()))
    }

    async fn list_record_sets(
        &self,
        zone_id: &str,
        _: Option<RecordCursor>,
    ) -> Result<Page<RecordSet, RecordCursor>> {
        let (_, records) = self
            .inventory
            .zones
            .iter()
            .find(|(zone, _)| zone.id == zone_id)
            .ok_or_else(|| anyhow!("NoSuchHostedZone: {zone_id}"))?;
        Ok(Page::last(records.clone()))
    }
}

#[async_trait]
impl CdnApi for Scoped {
    async fn list_distributions(&self, _: Option<String>) -> Result<Page<Distribution>> {
        self.inventory.check("cdn").await?;
        Ok(Page::last(self.inventory.distributions.clone()))
    }
}

#[async_trait]
impl AcceleratorApi for Scoped {
    async fn list_accelerators(&self, _: Option<String>) -> Result<Page<Accelerator>> {
        self.inventory.check("accelerators").await?;
        Ok(Page::last(self.inventory.accelerators.clone()))
    }
}

#[async_trait]
impl BucketApi for Scoped {
    async fn list_buckets(&self, _: Option<String>) -> Result<Page<Bucket>> {
        self.inventory.check("buckets").await?;
        Ok(Page::last(
            self.inventory.buckets.iter().map(|(name, ..)| Bucket { name: name.clone() }).collect(),
        ))
    }

    async fn bucket_location(&self, bucket: &str) -> Result<Option<String>> {
        self.inventory
            .buckets
            .iter()
            .find(|(name, ..)| name == bucket)
            .map(|(_, location, _)| location.clone())
            .ok_or_else(|| anyhow!("NoSuchBucket: {bucket}"))
    }

    async fn has_website(&self, bucket: &str, _region: &str) -> Result<bool> {
        self.inventory
            .buckets
            .iter()
            .find(|(name, ..)| name == bucket)
            .map(|(.., website)| *website)
            .ok_or_else(|| anyhow!("NoSuchBucket: {bucket}"))
    }
}

#[async_trait]
impl LoadBalancerApi for Scoped {
    async fn list_load_balancers(&self, _: Option<String>) -> Result<Page<LoadBalancer>> {
        self.inventory.check("load_balancers").await?;
        Ok(Page::last(self.regional(&self.inventory.load_balancers)))
    }

    async fn tags(&self, arn: &str) -> Result<Vec<(String, String)>> {
        if self.inventory.lb_tags_fail {
            bail!("Throttling: rate exceeded for {arn}");
        }
        Ok(vec![("kubernetes.io/cluster/prod".into(), "owned".into())])
    }
}

#[async_trait]
impl ApiGatewayV1Api for Scoped {
    async fn list_domain_names(&self, _: Option<String>) -> Result<Page<ApiDomain>> {
        self.inventory.check("apigw_v1").await?;
        Ok(self.domains(&self.inventory.apigw_v1))
    }
}

#[async_trait]
impl ApiGatewayV2Api for Scoped {
    async fn list_domain_names(&self, _: Option<String>) -> Result<Page<ApiDomain>> {
        self.inventory.check("apigw_v2").await?;
        Ok(self.domains(&self.inventory.apigw_v2))
    }
}

#[async_trait]
impl ComputeApi for Scoped {
    async fn list_running_instances(&self, _: Option<String>) -> Result<Page<Instance>> {
        self.inventory.check("instances").await?;
        Ok(Page::last(self.regional(&self.inventory.instances)))
    }

    async fn list_elastic_ips(&self) -> Result<Vec<ElasticIp>> {
        self.inventory.check("elastic_ips").await?;
        Ok(self.regional(&self.inventory.elastic_ips))
    }
}

#[async_trait]
impl CertificateApi for Scoped {
    async fn list_issued_certificates(&self, _: Option<String>) -> Result<Page<Certificate>> {
        self.inventory.check("certificates").await?;
        Ok(Page::last(self.regional(&self.inventory.certificates)))
    }
}

pub fn public_zone(id: &str, name: &str) -> HostedZone {
    HostedZone { id: id.into(), name: name.into(), private: false }
}

pub fn private_zone(id: &str, name: &str) -> HostedZone {
    HostedZone { id: id.into(), name: name.into(), private: true }
}

pub fn record(name: &str, record_type: &str, ttl: i64, value: &str) -> RecordSet {
    RecordSet {
        name: name.into(),
        record_type: record_type.into(),
        ttl: Some(ttl),
        values: vec![value.into()],
        alias_target: None,
    }
}

pub fn load_balancer(name: &str, region: &str) -> LoadBalancer {
    LoadBalancer {
        arn: format!("arn:aws:elasticloadbalancing:{region}:111122223333:loadbalancer/net/{name}/1"),
        name: name.into(),
        dns_name: format!("{name}-1.elb.{region}.amazonaws.com"),
        scheme: "internet-facing".into(),
        lb_type: "network".into(),
    }
}
