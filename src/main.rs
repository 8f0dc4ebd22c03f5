use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tickertape::app::{AppContext, Result, TickertapeError};
use tickertape::config::CrawlConfig;
use tickertape::crawler::Supervisor;
use tickertape::seeds;

#[derive(Parser)]
#[command(name = "tickertape", about = "Financial-news crawler")]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl pages: from a seed file, or re-seeded from pending store records.
    Crawl {
        /// Seed file of `url,tag` lines; omitted means scan the store.
        #[arg(long)]
        seeds: Option<PathBuf>,
        /// Narrow store re-seeding to URLs containing this domain substring.
        #[arg(long)]
        domain: Option<String>,
        #[arg(long)]
        workers: Option<usize>,
        /// Repeat cycles every N seconds instead of running once.
        #[arg(long)]
        loop_every: Option<u64>,
        #[arg(long)]
        max_seeds: Option<usize>,
        /// Bypass dedup and cache.
        #[arg(long)]
        force: bool,
    },
    /// Poll feeds listed in a seed file, honoring each feed's interval.
    Feeds {
        /// Seed file of `feed_url,ticker` lines.
        seeds: PathBuf,
        #[arg(long)]
        workers: Option<usize>,
        #[arg(long)]
        loop_every: Option<u64>,
        /// Poll even feeds that aren't due.
        #[arg(long)]
        force: bool,
    },
    /// List origin URLs that never fetched successfully.
    Pending {
        #[arg(long)]
        domain: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = CrawlConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Crawl {
            seeds,
            domain,
            workers,
            loop_every,
            max_seeds,
            force,
        } => {
            if let Some(workers) = workers {
                config.workers = workers;
            }
            if loop_every.is_some() {
                config.loop_every_secs = loop_every;
            }
            if max_seeds.is_some() {
                config.max_seeds = max_seeds;
            }
            config.force_refetch |= force;

            let ctx = AppContext::new(config)?;
            run_crawl(&ctx, seeds, domain).await?;
        }
        Commands::Feeds {
            seeds,
            workers,
            loop_every,
            force,
        } => {
            if let Some(workers) = workers {
                config.workers = workers;
            }
            if loop_every.is_some() {
                config.loop_every_secs = loop_every;
            }
            config.force_refetch |= force;

            let ctx = AppContext::new(config)?;
            run_feeds(&ctx, seeds).await?;
        }
        Commands::Pending { domain } => {
            let ctx = AppContext::new(config)?;
            for url in ctx.store.scan_pending(domain.as_deref())? {
                println!("{}", url);
            }
        }
    }

    Ok(())
}

/// Flips the supervisor's stop flag on Ctrl-C; the current cycle finishes
/// before the loop exits.
fn stop_on_ctrl_c(supervisor: &Supervisor) {
    let stop = supervisor.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("stop requested, finishing current cycle");
            stop.store(false, std::sync::atomic::Ordering::Release);
        }
    });
}

async fn run_crawl(
    ctx: &AppContext,
    seed_file: Option<PathBuf>,
    domain: Option<String>,
) -> Result<()> {
    let supervisor = Supervisor::new(ctx.config.loop_every_secs.map(Duration::from_secs));
    stop_on_ctrl_c(&supervisor);
    let crawler = ctx.crawler(ctx.config.workers);
    let store = ctx.store.clone();
    let max_seeds = ctx.config.max_seeds;
    let report_path = ctx.config.error_report_path.clone();

    supervisor
        .run(move || {
            let crawler = crawler.clone();
            let store = store.clone();
            let seed_file = seed_file.clone();
            let domain = domain.clone();
            let report_path = report_path.clone();
            async move {
                // Seeds are re-evaluated every cycle so store re-seeding
                // picks up pages that failed last time around.
                let targets = match seed_file {
                    Some(path) => seeds::from_path(&path)?,
                    None => seeds::from_store(store.as_ref(), domain.as_deref())?,
                };
                let targets = seeds::cap(targets, max_seeds);

                let report = crawler.run_cycle(targets).await?;
                println!(
                    "Cycle complete: {} persisted, {} skipped, {} failed",
                    report.persisted,
                    report.skipped,
                    report.failed_urls.len()
                );

                if let Some(path) = &report_path {
                    report.write_failed(path)?;
                }
                Ok(())
            }
        })
        .await
}

async fn run_feeds(ctx: &AppContext, seed_file: PathBuf) -> Result<()> {
    let supervisor = Supervisor::new(ctx.config.loop_every_secs.map(Duration::from_secs));
    stop_on_ctrl_c(&supervisor);
    let poller = ctx.feed_poller(ctx.config.workers);
    let max_seeds = ctx.config.max_seeds;

    supervisor
        .run(move || {
            let poller = poller.clone();
            let seed_file = seed_file.clone();
            async move {
                let targets = seeds::cap(seeds::from_path(&seed_file)?, max_seeds);
                if targets.is_empty() {
                    return Err(TickertapeError::Config(format!(
                        "No feed seeds in {}",
                        seed_file.display()
                    )));
                }

                let report = poller.run_cycle(targets).await?;
                println!(
                    "Feed cycle complete: {} polled, {} deferred, {} entries, {} failed",
                    report.polled,
                    report.deferred,
                    report.entries,
                    report.failed_urls.len()
                );
                Ok(())
            }
        })
        .await
}
