use super::{merge, CollectError, Emitter};
use crate::{
    hosts::normalize_host,
    provider::{ApiGatewayV1Api, ApiGatewayV2Api},
    record::Resource,
};

/// Both gateway generations are always queried; a failure of one does not hide
/// the other's domains.
pub(super) async fn collect(
    v1: &dyn ApiGatewayV1Api,
    v2: &dyn ApiGatewayV2Api,
    region: &str,
    emitter: &Emitter<'_>,
) -> Result<(), CollectError> {
    let first = collect_v1(v1, region, emitter).await;
    if matches!(first, Err(CollectError::Sink(_))) {
        return first;
    }
    let second = collect_v2(v2, region, emitter).await;
    merge(first, second)
}

async fn collect_v1(
    api: &dyn ApiGatewayV1Api,
    region: &str,
    emitter: &Emitter<'_>,
) -> Result<(), CollectError> {
    let mut next = None;
    loop {
        let page = api.list_domain_names(next).await?;
        for domain in page.items {
            if let Some(domain) = normalize_host(&domain.domain_name) {
                emitter.emit(Resource::ApigwV1Domain { domain, region: region.to_string() })?;
            }
        }
        match page.next {
            Some(token) => next = Some(token),
            None => return Ok(()),
        }
    }
}

async fn collect_v2(
    api: &dyn ApiGatewayV2Api,
    region: &str,
    emitter: &Emitter<'_>,
) -> Result<(), CollectError> {
    let mut next = None;
    loop {
        let page = api.list_domain_names(next).await?;
        for domain in page.items {
            if let Some(domain) = normalize_host(&domain.domain_name) {
                emitter.emit(Resource::ApigwV2Domain { domain, region: region.to_string() })?;
            }
        }
        match page.next {
            Some(token) => next = Some(token),
            None => return Ok(()),
        }
    }
}
