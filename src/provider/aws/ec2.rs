use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ec2::{types::Filter, Client};

use super::cursor;
use crate::provider::{ComputeApi, ElasticIp, Instance, Page, RegionCatalog, RegionInfo};

pub struct Ec2Compute {
    client: Client,
}

impl Ec2Compute {
    pub fn new(config: &SdkConfig) -> Self {
        Self { client: Client::new(config) }
    }
}

#[async_trait]
impl ComputeApi for Ec2Compute {
    async fn list_running_instances(&self, next: Option<String>) -> Result<Page<Instance>> {
        let running = Filter::builder().name("instance-state-name").values("running").build();
        let resp = self
            .client
            .describe_instances()
            .filters(running)
            .set_next_token(next)
            .send()
            .await
            .context("ec2:DescribeInstances failed")?;

        let instances = resp
            .reservations()
            .iter()
            .flat_map(|reservation| reservation.instances())
            .filter_map(|instance| {
                Some(Instance {
                    instance_id: instance.instance_id()?.to_string(),
                    public_ip: instance.public_ip_address().map(str::to_string),
                })
            })
            .collect();

        Ok(Page::new(instances, cursor(resp.next_token())))
    }

    async fn list_elastic_ips(&self) -> Result<Vec<ElasticIp>> {
        let resp =
            self.client.describe_addresses().send().await.context("ec2:DescribeAddresses failed")?;

        Ok(resp
            .addresses()
            .iter()
            .map(|address| ElasticIp {
                public_ip: address.public_ip().map(str::to_string),
                allocation_id: address.allocation_id().map(str::to_string),
            })
            .collect())
    }
}

#[async_trait]
impl RegionCatalog for Ec2Compute {
    async fn describe_regions(&self) -> Result<Vec<RegionInfo>> {
        let resp = self
            .client
            .describe_regions()
            .all_regions(true)
            .send()
            .await
            .context("ec2:DescribeRegions failed")?;

        Ok(resp
            .regions()
            .iter()
            .filter_map(|region| {
                Some(RegionInfo {
                    name: region.region_name()?.to_string(),
                    opt_in_status: region.opt_in_status().unwrap_or_default().to_string(),
                })
            })
            .collect())
    }
}
