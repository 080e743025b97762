use super::{CollectError, Emitter};
use crate::{provider::CertificateApi, record::Resource};

/// Certificate names are recorded but never registered as hosts.
pub(super) async fn collect(
    api: &dyn CertificateApi,
    region: &str,
    emitter: &Emitter<'_>,
) -> Result<(), CollectError> {
    let mut next = None;
    loop {
        let page = api.list_issued_certificates(next).await?;
        for cert in page.items {
            emitter.emit(Resource::Certificate {
                domain: cert.domain_name,
                alt: cert.alternative_names,
                region: region.to_string(),
            })?;
        }
        match page.next {
            Some(token) => next = Some(token),
            None => return Ok(()),
        }
    }
}
