use tracing::{debug, warn};

use super::{CollectError, Emitter};
use crate::{
    hosts::normalize_host,
    provider::{DnsApi, HostedZone, RecordSet},
    record::Resource,
};

/// Record types that can point at a reachable endpoint.
const ADDRESSABLE_TYPES: [&str; 4] = ["A", "AAAA", "CNAME", "ALIAS"];

/// Walks every public zone. A zone whose record listing fails is skipped and
/// reported once the remaining zones are done.
pub(super) async fn collect(api: &dyn DnsApi, emitter: &Emitter<'_>) -> Result<(), CollectError> {
    let mut failed_zones = Vec::new();
    let mut next = None;
    loop {
        let page = api.list_hosted_zones(next).await?;
        for zone in &page.items {
            if zone.private {
                debug!("Skipping private hosted zone {}", zone.name);
                continue;
            }
            match collect_zone(api, zone, emitter).await {
                Ok(()) => {}
                Err(err @ CollectError::Sink(_)) => return Err(err),
                Err(CollectError::Provider(err)) => {
                    warn!("Skipping record sets of hosted zone {}: {err:#}", zone.id);
                    failed_zones.push(format!("{}: {err:#}", zone.id));
                }
            }
        }
        match page.next {
            Some(token) => next = Some(token),
            None => break,
        }
    }

    if failed_zones.is_empty() {
        Ok(())
    } else {
        Err(CollectError::Provider(anyhow::anyhow!(
            "{} hosted zone(s) failed: {}",
            failed_zones.len(),
            failed_zones.join("; ")
        )))
    }
}

async fn collect_zone(
    api: &dyn DnsApi,
    zone: &HostedZone,
    emitter: &Emitter<'_>,
) -> Result<(), CollectError> {
    let mut next = None;
    loop {
        let page = api.list_record_sets(&zone.id, next).await?;
        for record in page.items {
            if let Some(resource) = to_resource(&zone.id, record) {
                emitter.emit(resource)?;
            }
        }
        match page.next {
            Some(cursor) => next = Some(cursor),
            None => return Ok(()),
        }
    }
}

fn to_resource(zone_id: &str, record: RecordSet) -> Option<Resource> {
    if !ADDRESSABLE_TYPES.contains(&record.record_type.as_str()) {
        return None;
    }
    let name = normalize_host(&record.name)?;
    let (ttl, values) = match record.alias_target {
        Some(target) => (None, vec![normalize_host(&target).unwrap_or(target)]),
        None => (record.ttl, record.values),
    };
    Some(Resource::DnsRecord {
        zone: zone_id.to_string(),
        name,
        record_type: record.record_type,
        ttl,
        values,
    })
}
