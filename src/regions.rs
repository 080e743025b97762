use anyhow::{Context, Result};

use crate::provider::{RegionCatalog, Session};

/// Opt-in states of regions the session can call into.
const ELIGIBLE_OPT_IN: [&str; 2] = ["opt-in-not-required", "opted-in"];

pub fn is_eligible(opt_in_status: &str) -> bool {
    ELIGIBLE_OPT_IN.contains(&opt_in_status)
}

/// Regions of the catalog that are enabled for the account. Order is not
/// meaningful.
pub async fn enabled_regions(catalog: &dyn RegionCatalog) -> Result<Vec<String>> {
    let regions = catalog.describe_regions().await.context("Failed to describe regions")?;
    Ok(regions
        .into_iter()
        .filter(|region| is_eligible(&region.opt_in_status))
        .map(|region| region.name)
        .collect())
}

pub async fn regions(session: &dyn Session) -> Result<Vec<String>> {
    enabled_regions(session.region_catalog().as_ref()).await
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::provider::RegionInfo;

    struct StaticCatalog(Vec<(&'static str, &'static str)>);

    #[async_trait]
    impl RegionCatalog for StaticCatalog {
        async fn describe_regions(&self) -> Result<Vec<RegionInfo>> {
            Ok(self
                .0
                .iter()
                .map(|(name, status)| RegionInfo {
                    name: name.to_string(),
                    opt_in_status: status.to_string(),
                })
                .collect())
        }
    }

    struct BrokenCatalog;

    #[async_trait]
    impl RegionCatalog for BrokenCatalog {
        async fn describe_regions(&self) -> Result<Vec<RegionInfo>> {
            Err(anyhow!("UnauthorizedOperation"))
        }
    }

    #[tokio::test]
    async fn only_enabled_regions_are_returned() -> Result<()> {
        let catalog = StaticCatalog(vec![
            ("us-east-1", "opt-in-not-required"),
            ("af-south-1", "not-opted-in"),
            ("ap-east-1", "opted-in"),
            ("me-central-1", ""),
        ]);
        let mut regions = enabled_regions(&catalog).await?;
        regions.sort();
        assert_eq!(regions, vec!["ap-east-1", "us-east-1"]);
        Ok(())
    }

    #[tokio::test]
    async fn catalog_failure_is_reported() {
        let err = enabled_regions(&BrokenCatalog).await.unwrap_err();
        assert!(format!("{err:#}").contains("UnauthorizedOperation"));
    }

    #[test]
    fn eligibility_is_exact() {
        assert!(is_eligible("opted-in"));
        assert!(!is_eligible("Opted-In"));
        assert!(!is_eligible("not-opted-in"));
    }
}
