use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::{
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    operation::get_bucket_website::GetBucketWebsiteError,
    Client,
};
use aws_types::region::Region;

use super::cursor;
use crate::provider::{Bucket, BucketApi, Page};

const NO_WEBSITE_CODE: &str = "NoSuchWebsiteConfiguration";

pub struct S3Buckets {
    config: SdkConfig,
    client: Client,
}

impl S3Buckets {
    pub fn new(config: &SdkConfig) -> Self {
        Self { config: config.clone(), client: Client::new(config) }
    }

    /// Website configuration must be read from the bucket's home region.
    fn client_for(&self, region: &str) -> Client {
        let conf = aws_sdk_s3::config::Builder::from(&self.config)
            .region(Region::new(region.to_string()))
            .build();
        Client::from_conf(conf)
    }
}

#[async_trait]
impl BucketApi for S3Buckets {
    async fn list_buckets(&self, next: Option<String>) -> Result<Page<Bucket>> {
        let resp = self
            .client
            .list_buckets()
            .set_continuation_token(next)
            .send()
            .await
            .context("s3:ListBuckets failed")?;

        let buckets = resp
            .buckets()
            .iter()
            .filter_map(|bucket| bucket.name())
            .map(|name| Bucket { name: name.to_string() })
            .collect();

        Ok(Page::new(buckets, cursor(resp.continuation_token())))
    }

    async fn bucket_location(&self, bucket: &str) -> Result<Option<String>> {
        let resp = self
            .client
            .get_bucket_location()
            .bucket(bucket)
            .send()
            .await
            .with_context(|| format!("s3:GetBucketLocation failed for {bucket}"))?;

        Ok(resp
            .location_constraint()
            .map(|constraint| constraint.as_str().to_string())
            .filter(|location| !location.is_empty()))
    }

    async fn has_website(&self, bucket: &str, region: &str) -> Result<bool> {
        match self.client_for(region).get_bucket_website().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(err) if is_missing_website(&err) => Ok(false),
            Err(err) => Err(anyhow::anyhow!(
                "s3:GetBucketWebsite failed for {bucket}: {}",
                DisplayErrorContext(&err)
            )),
        }
    }
}

fn is_missing_website<R>(err: &SdkError<GetBucketWebsiteError, R>) -> bool {
    err.as_service_error().and_then(|e| e.code()).is_some_and(|code| code == NO_WEBSITE_CODE)
}
