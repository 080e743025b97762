use super::{merge, CollectError, Emitter};
use crate::{hosts::normalize_host, provider::ComputeApi, record::Resource};

/// Instances and elastic addresses are separate sub-passes; both always run.
pub(super) async fn collect(
    api: &dyn ComputeApi,
    region: &str,
    emitter: &Emitter<'_>,
) -> Result<(), CollectError> {
    let instances = collect_instances(api, region, emitter).await;
    if matches!(instances, Err(CollectError::Sink(_))) {
        return instances;
    }
    let addresses = collect_elastic_ips(api, region, emitter).await;
    merge(instances, addresses)
}

async fn collect_instances(
    api: &dyn ComputeApi,
    region: &str,
    emitter: &Emitter<'_>,
) -> Result<(), CollectError> {
    let mut next = None;
    loop {
        let page = api.list_running_instances(next).await?;
        for instance in page.items {
            let Some(ip) = instance.public_ip.as_deref().and_then(normalize_host) else {
                continue;
            };
            emitter.emit(Resource::PublicInstance {
                ip,
                region: region.to_string(),
                instance_id: instance.instance_id,
            })?;
        }
        match page.next {
            Some(token) => next = Some(token),
            None => return Ok(()),
        }
    }
}

async fn collect_elastic_ips(
    api: &dyn ComputeApi,
    region: &str,
    emitter: &Emitter<'_>,
) -> Result<(), CollectError> {
    for address in api.list_elastic_ips().await? {
        let Some(ip) = address.public_ip.as_deref().and_then(normalize_host) else {
            continue;
        };
        emitter.emit(Resource::ElasticIp {
            ip,
            region: region.to_string(),
            allocation_id: address.allocation_id,
        })?;
    }
    Ok(())
}
