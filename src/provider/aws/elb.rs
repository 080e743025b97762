use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_elasticloadbalancingv2::Client;

use super::cursor;
use crate::provider::{LoadBalancer, LoadBalancerApi, Page};

pub struct ElbV2 {
    client: Client,
}

impl ElbV2 {
    pub fn new(config: &SdkConfig) -> Self {
        Self { client: Client::new(config) }
    }
}

#[async_trait]
impl LoadBalancerApi for ElbV2 {
    async fn list_load_balancers(&self, next: Option<String>) -> Result<Page<LoadBalancer>> {
        let resp = self
            .client
            .describe_load_balancers()
            .set_marker(next)
            .send()
            .await
            .context("elasticloadbalancing:DescribeLoadBalancers failed")?;

        let balancers = resp
            .load_balancers()
            .iter()
            .filter_map(|lb| {
                Some(LoadBalancer {
                    arn: lb.load_balancer_arn()?.to_string(),
                    name: lb.load_balancer_name().unwrap_or_default().to_string(),
                    dns_name: lb.dns_name()?.to_string(),
                    scheme: lb.scheme().map(|s| s.as_str().to_string()).unwrap_or_default(),
                    lb_type: lb.r#type().map(|t| t.as_str().to_string()).unwrap_or_default(),
                })
            })
            .collect();

        Ok(Page::new(balancers, cursor(resp.next_marker())))
    }

    async fn tags(&self, arn: &str) -> Result<Vec<(String, String)>> {
        let resp = self
            .client
            .describe_tags()
            .resource_arns(arn)
            .send()
            .await
            .with_context(|| format!("elasticloadbalancing:DescribeTags failed for {arn}"))?;

        Ok(resp
            .tag_descriptions()
            .iter()
            .flat_map(|desc| desc.tags())
            .map(|tag| (tag.key().to_string(), tag.value().unwrap_or_default().to_string()))
            .collect())
    }
}
