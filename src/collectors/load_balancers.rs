use std::collections::BTreeMap;

use tracing::debug;

use super::{CollectError, Emitter};
use crate::{
    hosts::normalize_host,
    provider::{LoadBalancer, LoadBalancerApi},
    record::Resource,
};

pub(super) async fn collect(
    api: &dyn LoadBalancerApi,
    region: &str,
    emitter: &Emitter<'_>,
) -> Result<(), CollectError> {
    let mut next = None;
    loop {
        let page = api.list_load_balancers(next).await?;
        for lb in page.items {
            let tags = tags_or_empty(api, &lb).await;
            let Some(dns) = normalize_host(&lb.dns_name) else {
                continue;
            };
            emitter.emit(Resource::LoadBalancer {
                name: lb.name,
                dns,
                scheme: lb.scheme,
                lb_type: lb.lb_type,
                region: region.to_string(),
                tags,
            })?;
        }
        match page.next {
            Some(token) => next = Some(token),
            None => return Ok(()),
        }
    }
}

/// Tags let later stages spot cluster ingress balancers. A failed lookup never
/// blocks the record.
async fn tags_or_empty(api: &dyn LoadBalancerApi, lb: &LoadBalancer) -> BTreeMap<String, String> {
    match api.tags(&lb.arn).await {
        Ok(tags) => tags.into_iter().collect(),
        Err(err) => {
            debug!("Tag lookup failed for {}: {err:#}", lb.arn);
            BTreeMap::new()
        }
    }
}
