//! Per-family resource collectors.
//!
//! Every collector drains its provider listing, turns each item into a
//! [`Resource`] and hands it to an [`Emitter`], which feeds both the record
//! sink and the host registry. A collector never deduplicates against other
//! families.

use std::sync::atomic::{AtomicUsize, Ordering};

use strum::{Display, EnumIter};

use crate::{
    hosts::HostRegistry,
    provider::Session,
    record::{DiscoveryRecord, Resource},
    sink::RecordSink,
};

mod accelerators;
mod api_gateway;
mod buckets;
mod cdn;
mod certificates;
mod compute;
mod dns;
mod load_balancers;

pub use buckets::website_endpoint;

/// Failure of one collector invocation.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    /// The provider call failed; the invocation is degraded and siblings go on.
    #[error(transparent)]
    Provider(#[from] anyhow::Error),

    /// The record sink rejected a write; the run cannot continue.
    #[error("record sink failed: {0:#}")]
    Sink(anyhow::Error),
}

impl CollectError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, CollectError::Sink(_))
    }
}

/// Combines the outcomes of two independent sub-passes. A sink failure wins;
/// two provider failures are reported together.
pub(crate) fn merge(
    first: Result<(), CollectError>,
    second: Result<(), CollectError>,
) -> Result<(), CollectError> {
    match (first, second) {
        (Ok(()), Ok(())) => Ok(()),
        (Err(err @ CollectError::Sink(_)), _) | (_, Err(err @ CollectError::Sink(_))) => Err(err),
        (Err(err), Ok(())) | (Ok(()), Err(err)) => Err(err),
        (Err(a), Err(b)) => Err(CollectError::Provider(anyhow::anyhow!("{a:#}; {b:#}"))),
    }
}

/// Resource families, one collector each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Family {
    Dns,
    Cdn,
    Accelerators,
    Buckets,
    LoadBalancers,
    ApiGateway,
    Compute,
    Certificates,
}

impl Family {
    /// Families enumerated once per session.
    pub const GLOBAL: [Family; 4] = [Family::Dns, Family::Cdn, Family::Accelerators, Family::Buckets];

    /// Families enumerated once per enabled region.
    pub const REGIONAL: [Family; 4] =
        [Family::LoadBalancers, Family::ApiGateway, Family::Compute, Family::Certificates];

    pub fn is_global(self) -> bool {
        Self::GLOBAL.contains(&self)
    }

    /// Runs this family's collector.
    ///
    /// `region` is the region being scanned for regional families and the
    /// partition default region for global ones.
    pub async fn collect(
        self,
        session: &dyn Session,
        region: &str,
        emitter: &Emitter<'_>,
    ) -> Result<(), CollectError> {
        match self {
            Family::Dns => dns::collect(session.dns().as_ref(), emitter).await,
            Family::Cdn => cdn::collect(session.cdn().as_ref(), emitter).await,
            Family::Accelerators => {
                accelerators::collect(session.accelerators().as_ref(), emitter).await
            }
            Family::Buckets => buckets::collect(session.buckets().as_ref(), region, emitter).await,
            Family::LoadBalancers => {
                load_balancers::collect(session.load_balancers(region).as_ref(), region, emitter)
                    .await
            }
            Family::ApiGateway => {
                api_gateway::collect(
                    session.api_gateway_v1(region).as_ref(),
                    session.api_gateway_v2(region).as_ref(),
                    region,
                    emitter,
                )
                .await
            }
            Family::Compute => {
                compute::collect(session.compute(region).as_ref(), region, emitter).await
            }
            Family::Certificates => {
                certificates::collect(session.certificates(region).as_ref(), region, emitter).await
            }
        }
    }
}

/// Shared output handles for one collector invocation.
pub struct Emitter<'a> {
    sink: &'a dyn RecordSink,
    hosts: &'a HostRegistry,
    account: Option<&'a str>,
    emitted: AtomicUsize,
}

impl<'a> Emitter<'a> {
    pub fn new(sink: &'a dyn RecordSink, hosts: &'a HostRegistry, account: Option<&'a str>) -> Self {
        Self { sink, hosts, account, emitted: AtomicUsize::new(0) }
    }

    /// Registers the resource's hosts and appends its record.
    pub fn emit(&self, resource: Resource) -> Result<(), CollectError> {
        for host in resource.hosts() {
            self.hosts.insert(host);
        }
        self.sink.write(&DiscoveryRecord::new(resource, self.account)).map_err(CollectError::Sink)?;
        self.emitted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Records emitted through this handle.
    pub fn emitted(&self) -> usize {
        self.emitted.load(Ordering::Relaxed)
    }
}
