use tracing::debug;

use super::{CollectError, Emitter};
use crate::{hosts::normalize_host, provider::AcceleratorApi, record::Resource};

pub(super) async fn collect(
    api: &dyn AcceleratorApi,
    emitter: &Emitter<'_>,
) -> Result<(), CollectError> {
    let mut next = None;
    loop {
        let page = api.list_accelerators(next).await?;
        for accelerator in page.items {
            let Some(dns) = accelerator.dns_name.as_deref().and_then(normalize_host) else {
                debug!("Accelerator {} has no DNS name yet", accelerator.arn);
                continue;
            };
            emitter.emit(Resource::GlobalAccelerator { dns, enabled: accelerator.enabled })?;
        }
        match page.next {
            Some(token) => next = Some(token),
            None => return Ok(()),
        }
    }
}
