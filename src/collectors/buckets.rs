use anyhow::Result;
use tracing::debug;

use super::{CollectError, Emitter};
use crate::{
    provider::{Bucket, BucketApi},
    record::Resource,
};

/// Regions whose website endpoints use `s3-website-<region>`; every other
/// region uses `s3-website.<region>`.
const DASH_WEBSITE_REGIONS: [&str; 9] = [
    "us-east-1",
    "us-west-1",
    "us-west-2",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-northeast-1",
    "eu-west-1",
    "sa-east-1",
    "us-gov-west-1",
];

/// Static website endpoint of a bucket living in `region`.
pub fn website_endpoint(bucket: &str, region: &str) -> String {
    if DASH_WEBSITE_REGIONS.contains(&region) {
        format!("{bucket}.s3-website-{region}.amazonaws.com")
    } else {
        format!("{bucket}.s3-website.{region}.amazonaws.com")
    }
}

/// Maps a raw location constraint to a region name.
fn bucket_region(location: Option<&str>, default_region: &str) -> String {
    match location.map(str::trim) {
        None | Some("") => default_region.to_string(),
        Some("EU") => "eu-west-1".to_string(),
        Some(region) => region.to_string(),
    }
}

/// Emits one record per bucket with website hosting enabled.
///
/// Lookups for a single bucket that fail are skipped without degrading the
/// family; only a failed listing does.
pub(super) async fn collect(
    api: &dyn BucketApi,
    default_region: &str,
    emitter: &Emitter<'_>,
) -> Result<(), CollectError> {
    let mut next = None;
    loop {
        let page = api.list_buckets(next).await?;
        for bucket in page.items {
            match website(api, &bucket, default_region).await {
                Ok(Some(resource)) => emitter.emit(resource)?,
                Ok(None) => {}
                Err(err) => debug!("Skipping bucket {}: {err:#}", bucket.name),
            }
        }
        match page.next {
            Some(token) => next = Some(token),
            None => return Ok(()),
        }
    }
}

async fn website(api: &dyn BucketApi, bucket: &Bucket, default_region: &str) -> Result<Option<Resource>> {
    let location = api.bucket_location(&bucket.name).await?;
    let region = bucket_region(location.as_deref(), default_region);
    if !api.has_website(&bucket.name, &region).await? {
        return Ok(None);
    }
    Ok(Some(Resource::S3Website {
        bucket: bucket.name.clone(),
        endpoint: website_endpoint(&bucket.name, &region),
        region,
    }))
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        collectors::testing::{one_per_page, Harness},
        provider::Page,
    };

    /// `(name, location, website)`; a bucket named `locked-*` fails its lookups.
    struct Buckets(Vec<(&'static str, Option<&'static str>, bool)>);

    impl Buckets {
        fn find(&self, bucket: &str) -> Result<&(&'static str, Option<&'static str>, bool)> {
            if bucket.starts_with("locked-") {
                return Err(anyhow!("AccessDenied"));
            }
            self.0.iter().find(|(name, ..)| *name == bucket).ok_or_else(|| anyhow!("NoSuchBucket"))
        }
    }

    #[async_trait]
    impl BucketApi for Buckets {
        async fn list_buckets(&self, next: Option<String>) -> Result<Page<Bucket>> {
            let buckets: Vec<Bucket> = self.0.iter().map(|(name, ..)| Bucket { name: name.to_string() }).collect();
            one_per_page(&buckets, next)
        }

        async fn bucket_location(&self, bucket: &str) -> Result<Option<String>> {
            Ok(self.find(bucket)?.1.map(str::to_string))
        }

        async fn has_website(&self, bucket: &str, _region: &str) -> Result<bool> {
            Ok(self.find(bucket)?.2)
        }
    }

    #[test]
    fn website_endpoints_follow_the_region_format() {
        assert_eq!(website_endpoint("site", "us-east-1"), "site.s3-website-us-east-1.amazonaws.com");
        assert_eq!(website_endpoint("site", "eu-west-1"), "site.s3-website-eu-west-1.amazonaws.com");
        assert_eq!(website_endpoint("site", "eu-central-1"), "site.s3-website.eu-central-1.amazonaws.com");
        assert_eq!(website_endpoint("site", "ap-south-1"), "site.s3-website.ap-south-1.amazonaws.com");
        assert_eq!(website_endpoint("site", "eu-west-2"), "site.s3-website.eu-west-2.amazonaws.com");
    }

    #[test]
    fn location_constraints_resolve_to_regions() {
        assert_eq!(bucket_region(None, "us-east-1"), "us-east-1");
        assert_eq!(bucket_region(Some(""), "us-east-1"), "us-east-1");
        assert_eq!(bucket_region(Some("EU"), "us-east-1"), "eu-west-1");
        assert_eq!(bucket_region(Some("ap-southeast-2"), "us-east-1"), "ap-southeast-2");
    }

    #[tokio::test]
    async fn only_website_buckets_are_emitted() -> Result<()> {
        let api = Buckets(vec![
            ("site", None, true),
            ("logs", Some("eu-central-1"), false),
            ("docs", Some("eu-central-1"), true),
            ("locked-archive", Some("us-west-2"), true),
        ]);
        let harness = Harness::default();
        collect(&api, "us-east-1", &harness.emitter()).await?;

        assert_eq!(
            harness.resources(),
            vec![
                Resource::S3Website {
                    bucket: "site".into(),
                    endpoint: "site.s3-website-us-east-1.amazonaws.com".into(),
                    region: "us-east-1".into(),
                },
                Resource::S3Website {
                    bucket: "docs".into(),
                    endpoint: "docs.s3-website.eu-central-1.amazonaws.com".into(),
                    region: "eu-central-1".into(),
                },
            ]
        );
        assert!(!harness.hosts.contains(&website_endpoint("logs", "eu-central-1")));
        Ok(())
    }
}
