#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::time::Duration;

use anyhow::{Context, Result};
use surfacer::{
    cli::{
        commands::{enumerate::EnumerateArgs, regions::RegionsArgs},
        global::Command,
        CommandLineArgs, GlobalArgs,
    },
    provider::aws::load_seed_session,
    regions,
    runner::{run_to_artifacts, ArtifactPaths},
    summary,
};
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_core::metadata::LevelFilter;
use tracing_subscriber::{
    self, fmt, prelude::__tracing_subscriber_SubscriberExt, registry, util::SubscriberInitExt,
};

fn main() -> Result<()> {
    color_backtrace::install();
    let args = CommandLineArgs::parse_args();

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;
    let exit_code = runtime.block_on(async_main(args))?;
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}

fn setup_logging(global_args: &GlobalArgs) {
    let filter = if global_args.log_all_targets() {
        // Enable TRACE for all modules
        tracing_subscriber::filter::Targets::new().with_default(LevelFilter::TRACE)
    } else {
        tracing_subscriber::filter::Targets::new()
            .with_default(LevelFilter::ERROR) // Default for all modules
            .with_target("surfacer", global_args.log_level())
    };
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr) // Write logs to stderr
        .with_target(true)
        .with_ansi(false)
        .without_time();
    registry().with(fmt_layer).with(filter).init();
}

async fn async_main(args: CommandLineArgs) -> Result<i32> {
    setup_logging(&args.global_args);
    match args.command {
        Command::Enumerate(enumerate_args) => run_enumerate(&args.global_args, &enumerate_args).await,
        Command::Regions(regions_args) => {
            run_regions(&regions_args).await?;
            Ok(0)
        }
    }
}

/// Runs the full pipeline. Artifacts are finalized even when the global
/// timeout fires; the timeout still fails the run.
async fn run_enumerate(global_args: &GlobalArgs, args: &EnumerateArgs) -> Result<i32> {
    let options = args.run_options();
    if options.multi_account && options.role.is_none() {
        anyhow::bail!("--enum-orgs requires --role-to-assume (or ROLE_TO_ASSUME)");
    }

    let seed = load_seed_session(&args.aws.api_settings()).await?;
    let paths = ArtifactPaths {
        records: args.ndjson_out.clone(),
        hosts: args.hosts_out.clone(),
        summary: args.summary_out.clone(),
    };
    let outcome = run_to_artifacts(seed, &options, &paths, Duration::from_secs(args.timeout)).await?;
    info!("{} hosts, {} summary rows", outcome.summary.hosts.len(), outcome.summary.rows.len());

    if !outcome.report.degraded.is_empty() {
        warn!("{} collector invocations were degraded", outcome.report.degraded.len());
    }
    if !global_args.quiet {
        summary::print_run_summary(&outcome.report, &paths.all());
    }

    Ok(if outcome.timed_out { 1 } else { 0 })
}

async fn run_regions(args: &RegionsArgs) -> Result<()> {
    let seed = load_seed_session(&args.aws.api_settings()).await?;
    let mut enabled = regions::regions(seed.as_ref()).await?;
    enabled.sort();
    for region in enabled {
        println!("{region}");
    }
    Ok(())
}
