use clap::Parser;
use ddns_application::ports::ClusterMembership;
use ddns_domain::config::{CliOverrides, DdnsMode};
use ddns_infrastructure::cluster::LocalClusterMembership;
use ddns_jobs::{AddressCacheJob, ClusterSyncJob, HostMapSyncJob, JobRunner};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

mod bootstrap;
mod di;
mod server;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "ddns")]
#[command(version)]
#[command(about = "Dynamic DNS responder with authenticated UDP registration")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// DNS listener address (UDP + TCP)
    #[arg(short = 'd', long, value_name = "ADDR")]
    dns_bind: Option<String>,

    /// Registration listener address
    #[arg(short = 'u', long, value_name = "ADDR")]
    udp_binding: Option<String>,

    /// Registration source: udp, cluster or both
    #[arg(short = 'm', long)]
    mode: Option<DdnsMode>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        dns_bind: cli.dns_bind.clone(),
        udp_binding: cli.udp_binding.clone(),
        mode: cli.mode,
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config.logging);

    info!(
        mode = %config.ddns.mode,
        "Starting DDNS responder v{}",
        env!("CARGO_PKG_VERSION")
    );

    let state = di::build_state(&config.ddns);
    let use_cases = di::UseCases::new(&config, &state);
    let shutdown = CancellationToken::new();

    let mut servers = Vec::new();

    if config.ddns.mode.uses_udp() {
        servers.push(server::start_registration_listener(
            &config.ddns,
            Arc::clone(&use_cases.apply_registration),
            Arc::clone(state.counters()),
            shutdown.clone(),
        )?);
    }

    let cluster = if config.ddns.mode.uses_cluster() {
        let node_id =
            std::env::var("HOSTNAME").unwrap_or_else(|_| format!("ddns-{}", std::process::id()));
        Some(LocalClusterMembership::new(node_id, config.ddns.bk_interval()))
    } else {
        None
    };

    let mut runner = JobRunner::new()
        .with_host_map_sync(
            HostMapSyncJob::new(
                Arc::clone(&use_cases.sync_host_map),
                Arc::clone(state.counters()),
            )
            .with_intervals(config.ddns.bk_interval(), config.ddns.resync_interval()),
        )
        .with_address_cache(AddressCacheJob::new(Arc::clone(
            &use_cases.refresh_address_cache,
        )))
        .with_shutdown_token(shutdown.clone());

    if let Some(cluster) = &cluster {
        let membership: Arc<dyn ClusterMembership> = cluster.clone();
        runner = runner.with_cluster_sync(ClusterSyncJob::new(
            Arc::clone(&membership),
            Arc::clone(&use_cases.sync_host_map),
        ));
    }

    let jobs = runner.start();

    // The sync job reads `status()` after subscribing, so either start order works.
    if let Some(cluster) = &cluster {
        cluster.start().await?;
    }

    servers.push(server::start_dns_server(
        &config.server.dns_bind,
        Arc::clone(&use_cases.resolve_query),
        shutdown.clone(),
    )?);

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    shutdown.cancel();

    if let Some(cluster) = &cluster {
        if let Err(e) = cluster.stop().await {
            warn!(error = %e, "Cluster membership did not stop cleanly");
        }
    }

    for handle in servers {
        match tokio::time::timeout(SHUTDOWN_TIMEOUT, handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(error = %e, "Listener task failed"),
            Err(_) => warn!("Listener did not stop in time"),
        }
    }

    let aborted = jobs.join(SHUTDOWN_TIMEOUT).await;
    if aborted > 0 {
        warn!(aborted, "Background jobs aborted during shutdown");
    }

    info!("Server shutdown complete");
    Ok(())
}
