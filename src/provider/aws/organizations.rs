use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_organizations::Client;

use super::cursor;
use crate::provider::{Account, AccountDirectory, AccountStatus, Page};

pub struct OrganizationsDirectory {
    client: Client,
}

impl OrganizationsDirectory {
    pub fn new(config: &SdkConfig) -> Self {
        Self { client: Client::new(config) }
    }
}

#[async_trait]
impl AccountDirectory for OrganizationsDirectory {
    async fn list_accounts(&self, next: Option<String>) -> Result<Page<Account>> {
        let resp = self
            .client
            .list_accounts()
            .set_next_token(next)
            .send()
            .await
            .context("organizations:ListAccounts failed")?;

        #[allow(deprecated)]
        let accounts = resp
            .accounts()
            .iter()
            .filter_map(|account| {
                Some(Account {
                    id: account.id()?.to_string(),
                    status: account
                        .status()
                        .map(|status| AccountStatus::from(status.as_str()))
                        .unwrap_or(AccountStatus::Unknown),
                })
            })
            .collect();

        Ok(Page::new(accounts, cursor(resp.next_token())))
    }
}
