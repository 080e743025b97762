use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_cloudfront::{types::DistributionSummary, Client};

use super::cursor;
use crate::provider::{CdnApi, Distribution, Page};

pub struct CloudFrontCdn {
    client: Client,
}

impl CloudFrontCdn {
    pub fn new(config: &SdkConfig) -> Self {
        Self { client: Client::new(config) }
    }
}

#[async_trait]
impl CdnApi for CloudFrontCdn {
    async fn list_distributions(&self, next: Option<String>) -> Result<Page<Distribution>> {
        let resp = self
            .client
            .list_distributions()
            .set_marker(next)
            .send()
            .await
            .context("cloudfront:ListDistributions failed")?;

        let Some(list) = resp.distribution_list() else {
            return Ok(Page::last(Vec::new()));
        };

        let distributions = list.items().iter().map(to_distribution).collect();
        let next = if list.is_truncated() { cursor(list.next_marker()) } else { None };
        Ok(Page::new(distributions, next))
    }
}

fn to_distribution(summary: &DistributionSummary) -> Distribution {
    let origin_access_control = summary.origins().is_some_and(|origins| {
        origins
            .items()
            .iter()
            .any(|origin| origin.origin_access_control_id().is_some_and(|id| !id.is_empty()))
    });

    Distribution {
        id: summary.id().to_string(),
        domain_name: summary.domain_name().to_string(),
        aliases: summary.aliases().map(|aliases| aliases.items().to_vec()).unwrap_or_default(),
        origin_access_control,
    }
}
