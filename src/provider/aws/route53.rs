use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_route53::{types::RrType, Client};

use super::cursor;
use crate::provider::{DnsApi, HostedZone, Page, RecordCursor, RecordSet};

pub struct Route53Dns {
    client: Client,
}

impl Route53Dns {
    pub fn new(config: &SdkConfig) -> Self {
        Self { client: Client::new(config) }
    }
}

#[async_trait]
impl DnsApi for Route53Dns {
    async fn list_hosted_zones(&self, next: Option<String>) -> Result<Page<HostedZone>> {
        let resp = self
            .client
            .list_hosted_zones()
            .set_marker(next)
            .send()
            .await
            .context("route53:ListHostedZones failed")?;

        let zones = resp
            .hosted_zones()
            .iter()
            .map(|zone| HostedZone {
                id: zone.id().to_string(),
                name: zone.name().to_string(),
                private: zone.config().is_some_and(|config| config.private_zone()),
            })
            .collect();

        let next = if resp.is_truncated() { cursor(resp.next_marker()) } else { None };
        Ok(Page::new(zones, next))
    }

    async fn list_record_sets(
        &self,
        zone_id: &str,
        next: Option<RecordCursor>,
    ) -> Result<Page<RecordSet, RecordCursor>> {
        let mut req = self.client.list_resource_record_sets().hosted_zone_id(zone_id);
        if let Some(start) = next {
            req = req
                .start_record_name(start.name)
                .set_start_record_type(start.record_type.as_deref().map(RrType::from))
                .set_start_record_identifier(start.identifier);
        }

        let resp = req
            .send()
            .await
            .with_context(|| format!("route53:ListResourceRecordSets failed for {zone_id}"))?;

        let records = resp
            .resource_record_sets()
            .iter()
            .map(|rr| RecordSet {
                name: rr.name().to_string(),
                record_type: rr.r#type().as_str().to_string(),
                ttl: rr.ttl(),
                values: rr.resource_records().iter().map(|r| r.value().to_string()).collect(),
                alias_target: rr.alias_target().map(|target| target.dns_name().to_string()),
            })
            .collect();

        let next = if resp.is_truncated() {
            cursor(resp.next_record_name()).map(|name| RecordCursor {
                name,
                record_type: resp.next_record_type().map(|t| t.as_str().to_string()),
                identifier: cursor(resp.next_record_identifier()),
            })
        } else {
            None
        };

        Ok(Page::new(records, next))
    }
}
