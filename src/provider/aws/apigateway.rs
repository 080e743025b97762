use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::SdkConfig;

use super::cursor;
use crate::provider::{ApiDomain, ApiGatewayV1Api, ApiGatewayV2Api, Page};

/// Largest page the REST API gateway accepts.
const V1_PAGE_LIMIT: i32 = 500;

/// Custom domains of REST APIs.
pub struct RestApiDomains {
    client: aws_sdk_apigateway::Client,
}

impl RestApiDomains {
    pub fn new(config: &SdkConfig) -> Self {
        Self { client: aws_sdk_apigateway::Client::new(config) }
    }
}

#[async_trait]
impl ApiGatewayV1Api for RestApiDomains {
    async fn list_domain_names(&self, next: Option<String>) -> Result<Page<ApiDomain>> {
        let resp = self
            .client
            .get_domain_names()
            .set_position(next)
            .limit(V1_PAGE_LIMIT)
            .send()
            .await
            .context("apigateway:GetDomainNames failed")?;

        let domains = resp
            .items()
            .iter()
            .filter_map(|item| item.domain_name())
            .map(|name| ApiDomain { domain_name: name.to_string() })
            .collect();

        Ok(Page::new(domains, cursor(resp.position())))
    }
}

/// Custom domains of HTTP and WebSocket APIs.
pub struct HttpApiDomains {
    client: aws_sdk_apigatewayv2::Client,
}

impl HttpApiDomains {
    pub fn new(config: &SdkConfig) -> Self {
        Self { client: aws_sdk_apigatewayv2::Client::new(config) }
    }
}

#[async_trait]
impl ApiGatewayV2Api for HttpApiDomains {
    async fn list_domain_names(&self, next: Option<String>) -> Result<Page<ApiDomain>> {
        let resp = self
            .client
            .get_domain_names()
            .set_next_token(next)
            .send()
            .await
            .context("apigatewayv2:GetDomainNames failed")?;

        let domains = resp
            .items()
            .iter()
            .map(|item| ApiDomain { domain_name: item.domain_name().to_string() })
            .collect();

        Ok(Page::new(domains, cursor(resp.next_token())))
    }
}
