use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result};
use futures::{stream, StreamExt, TryStreamExt};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::{
    accounts::{AccountWalker, RoleTemplate, SkippedAccount},
    collectors::{CollectError, Emitter, Family},
    hosts::HostRegistry,
    provider::Session,
    regions,
    sink::{NdjsonSink, RecordSink},
    summary::{self, Summary},
};

/// Component name used when the region catalog itself fails.
const REGIONS_COMPONENT: &str = "regions";

/// Settings for one enumeration run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub multi_account: bool,
    pub role: Option<RoleTemplate>,
    pub session_name: String,
    /// Regions enumerated at once within one session; `1` is fully sequential.
    pub region_concurrency: usize,
    /// Region for global services and buckets without a location constraint.
    pub default_region: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            multi_account: false,
            role: None,
            session_name: "asi-enum".into(),
            region_concurrency: 4,
            default_region: "us-east-1".into(),
        }
    }
}

/// A collector invocation that finished without its full output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Degradation {
    pub account: String,
    /// `None` for global families and for the region catalog.
    pub region: Option<String>,
    pub component: String,
    pub cause: String,
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let region = self.region.as_deref().unwrap_or("global");
        write!(f, "{}/{}/{}: {}", self.account, region, self.component, self.cause)
    }
}

/// Run-level tally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub sessions: usize,
    pub skipped_accounts: Vec<SkippedAccount>,
    pub regions: usize,
    pub records: usize,
    pub hosts: usize,
    pub degraded: Vec<Degradation>,
}

/// Drives every session, family and region into one sink and registry.
///
/// The report is kept behind a lock so a caller that abandons the run (for
/// example on a global timeout) can still read what was tallied so far.
pub struct Runner<'a> {
    options: RunOptions,
    sink: &'a dyn RecordSink,
    hosts: &'a HostRegistry,
    report: Mutex<RunReport>,
}

impl<'a> Runner<'a> {
    pub fn new(options: RunOptions, sink: &'a dyn RecordSink, hosts: &'a HostRegistry) -> Self {
        Self { options, sink, hosts, report: Mutex::new(RunReport::default()) }
    }

    /// Snapshot of the tally.
    pub fn report(&self) -> RunReport {
        let mut report = self.report.lock().clone();
        report.hosts = self.hosts.len();
        report
    }

    /// Enumerates every eligible account, one session at a time.
    ///
    /// Only a failed seed-level step (account listing, configuration) or a
    /// sink failure returns an error; everything else is tallied.
    pub async fn run(&self, seed: Arc<dyn Session>) -> Result<()> {
        let walker = AccountWalker::new(
            seed,
            self.options.multi_account,
            self.options.role.clone(),
            self.options.session_name.clone(),
        );
        let plan = walker.plan().await?;
        self.report.lock().skipped_accounts.extend(plan.skipped);

        for target in &plan.targets {
            let session = match walker.open_or_skip(target).await {
                Ok(session) => session,
                Err(skipped) => {
                    self.report.lock().skipped_accounts.push(skipped);
                    continue;
                }
            };
            self.enumerate_session(session.as_ref()).await?;
            self.report.lock().sessions += 1;
        }
        Ok(())
    }

    async fn enumerate_session(&self, session: &dyn Session) -> Result<()> {
        let account = session.account_id().unwrap_or("unknown");
        info!("Enumerating account {account}");

        for family in Family::GLOBAL {
            self.invoke(session, family, None).await?;
        }

        let regions = match regions::regions(session).await {
            Ok(regions) => regions,
            Err(err) => {
                self.degrade(account, None, REGIONS_COMPONENT, &err);
                return Ok(());
            }
        };
        debug!("Account {account}: {} enabled regions", regions.len());
        self.report.lock().regions += regions.len();

        let concurrency = self.options.region_concurrency.max(1);
        stream::iter(regions.iter().map(|region| self.enumerate_region(session, region)))
            .buffer_unordered(concurrency)
            .try_collect::<Vec<()>>()
            .await?;
        Ok(())
    }

    async fn enumerate_region(&self, session: &dyn Session, region: &str) -> Result<()> {
        for family in Family::REGIONAL {
            self.invoke(session, family, Some(region)).await?;
        }
        Ok(())
    }

    /// Runs one collector. Provider failures are tallied; sink failures abort.
    async fn invoke(&self, session: &dyn Session, family: Family, region: Option<&str>) -> Result<()> {
        let account = session.account_id();
        let emitter = Emitter::new(self.sink, self.hosts, account);
        let scope = region.unwrap_or(&self.options.default_region);

        let outcome = family.collect(session, scope, &emitter).await;
        self.report.lock().records += emitter.emitted();

        match outcome {
            Ok(()) => {
                debug!(
                    "{family} in {} ({}): {} records",
                    account.unwrap_or("unknown"),
                    region.unwrap_or("global"),
                    emitter.emitted()
                );
                Ok(())
            }
            Err(CollectError::Sink(err)) => Err(err).with_context(|| {
                format!("Failed to record {family} results for {}", account.unwrap_or("unknown"))
            }),
            Err(CollectError::Provider(err)) => {
                self.degrade(account.unwrap_or("unknown"), region, &family.to_string(), &err);
                Ok(())
            }
        }
    }

    fn degrade(&self, account: &str, region: Option<&str>, component: &str, cause: &anyhow::Error) {
        warn!(
            "{component} degraded for account {account} in {}: {cause:#}",
            region.unwrap_or("global")
        );
        self.report.lock().degraded.push(Degradation {
            account: account.to_string(),
            region: region.map(str::to_string),
            component: component.to_string(),
            cause: format!("{cause:#}"),
        });
    }
}

/// Runs a complete enumeration and returns its tally.
pub async fn run_enumeration(
    seed: Arc<dyn Session>,
    options: &RunOptions,
    sink: &dyn RecordSink,
    hosts: &HostRegistry,
) -> Result<RunReport> {
    let runner = Runner::new(options.clone(), sink, hosts);
    runner.run(seed).await?;
    sink.flush()?;
    Ok(runner.report())
}

/// Like [`run_enumeration`], but gives up once `budget` has elapsed.
///
/// The sink is flushed either way and the report covers whatever finished
/// before the deadline. The flag is `true` when the deadline was hit.
pub async fn run_with_deadline(
    seed: Arc<dyn Session>,
    options: &RunOptions,
    sink: &dyn RecordSink,
    hosts: &HostRegistry,
    budget: Duration,
) -> Result<(RunReport, bool)> {
    let runner = Runner::new(options.clone(), sink, hosts);
    let timed_out = match tokio::time::timeout(budget, runner.run(seed)).await {
        Ok(outcome) => {
            outcome?;
            false
        }
        Err(_) => {
            error!("Enumeration exceeded the {}s run timeout; writing partial artifacts", budget.as_secs());
            true
        }
    };
    sink.flush()?;
    Ok((runner.report(), timed_out))
}

/// Destinations of the three run artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub records: PathBuf,
    pub hosts: PathBuf,
    pub summary: PathBuf,
}

impl ArtifactPaths {
    pub fn all(&self) -> [&Path; 3] {
        [&self.records, &self.hosts, &self.summary]
    }
}

/// Result of a run that wrote its artifacts.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: RunReport,
    pub summary: Summary,
    pub timed_out: bool,
}

/// Streams records to `paths.records`, then writes the host list and the
/// summary table. Both are written after a timeout too, from the partial
/// stream.
pub async fn run_to_artifacts(
    seed: Arc<dyn Session>,
    options: &RunOptions,
    paths: &ArtifactPaths,
    budget: Duration,
) -> Result<RunOutcome> {
    let hosts = HostRegistry::new();
    let sink = NdjsonSink::create(&paths.records)?;
    let (report, timed_out) = run_with_deadline(seed, options, &sink, &hosts, budget).await?;
    drop(sink);

    let summary = summary::write_artifacts(&paths.records, &hosts, &paths.hosts, &paths.summary)?;
    Ok(RunOutcome { report, summary, timed_out })
}
