use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_globalaccelerator::Client;

use super::cursor;
use crate::provider::{Accelerator, AcceleratorApi, Page};

pub struct GlobalAccelerators {
    client: Client,
}

impl GlobalAccelerators {
    pub fn new(config: &SdkConfig) -> Self {
        Self { client: Client::new(config) }
    }
}

#[async_trait]
impl AcceleratorApi for GlobalAccelerators {
    async fn list_accelerators(&self, next: Option<String>) -> Result<Page<Accelerator>> {
        let resp = self
            .client
            .list_accelerators()
            .set_next_token(next)
            .send()
            .await
            .context("globalaccelerator:ListAccelerators failed")?;

        let accelerators = resp
            .accelerators()
            .iter()
            .map(|acc| Accelerator {
                arn: acc.accelerator_arn().unwrap_or_default().to_string(),
                dns_name: acc.dns_name().map(str::to_string),
                enabled: acc.enabled().unwrap_or(false),
            })
            .collect();

        Ok(Page::new(accelerators, cursor(resp.next_token())))
    }
}
