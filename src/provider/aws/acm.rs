use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_acm::{
    types::{CertificateStatus, Filters, KeyAlgorithm},
    Client,
};

use super::cursor;
use crate::provider::{Certificate, CertificateApi, Page};

pub struct AcmCertificates {
    client: Client,
}

impl AcmCertificates {
    pub fn new(config: &SdkConfig) -> Self {
        Self { client: Client::new(config) }
    }
}

/// Every key algorithm ACM knows. `ListCertificates` only returns RSA_2048
/// certificates unless the key types are named.
fn all_key_types() -> Vec<KeyAlgorithm> {
    KeyAlgorithm::values().iter().map(|name| KeyAlgorithm::from(*name)).collect()
}

#[async_trait]
impl CertificateApi for AcmCertificates {
    /// Issued certificates of every key type.
    async fn list_issued_certificates(&self, next: Option<String>) -> Result<Page<Certificate>> {
        let resp = self
            .client
            .list_certificates()
            .certificate_statuses(CertificateStatus::Issued)
            .includes(Filters::builder().set_key_types(Some(all_key_types())).build())
            .set_next_token(next)
            .send()
            .await
            .context("acm:ListCertificates failed")?;

        let certificates = resp
            .certificate_summary_list()
            .iter()
            .map(|cert| Certificate {
                arn: cert.certificate_arn().unwrap_or_default().to_string(),
                domain_name: cert.domain_name().map(str::to_string),
                alternative_names: cert.subject_alternative_name_summaries().to_vec(),
            })
            .collect();

        Ok(Page::new(certificates, cursor(resp.next_token())))
    }
}
