use super::{CollectError, Emitter};
use crate::{hosts::normalize_host, provider::CdnApi, record::Resource};

pub(super) async fn collect(api: &dyn CdnApi, emitter: &Emitter<'_>) -> Result<(), CollectError> {
    let mut next = None;
    loop {
        let page = api.list_distributions(next).await?;
        for distribution in page.items {
            let Some(domain) = normalize_host(&distribution.domain_name) else {
                continue;
            };
            let alts = distribution.aliases.iter().filter_map(|alias| normalize_host(alias)).collect();
            emitter.emit(Resource::CdnDistribution {
                id: distribution.id,
                domain,
                alts,
                oac: distribution.origin_access_control,
            })?;
        }
        match page.next {
            Some(token) => next = Some(token),
            None => return Ok(()),
        }
    }
}
