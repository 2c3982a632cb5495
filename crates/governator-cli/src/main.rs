//! governator: deploys scheduled image changes to Docker Swarm services.

use anyhow::Context;
use clap::Parser;
use governator_config::{AgentConfig, DockerHost, ValidatedConfig};
use governator_deployer::{DeployStateClient, Deployer, SwarmClusterControl, Worker};
use governator_queue::RedisQueueStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DOCKER_TIMEOUT_SECS: u64 = 120;

#[derive(Parser)]
#[command(name = "governator", version)]
#[command(about = "Pulls scheduled deploys from Redis and rolls them out to Swarm services", long_about = None)]
struct Cli {
    /// Optional KDL configuration file; flags and environment override it
    #[arg(long, env = "GOVERNATOR_CONFIG")]
    config: Option<PathBuf>,

    /// Docker server to deploy to [default: Docker client local defaults]
    #[arg(short = 'd', long, env = "GOVERNATOR_DOCKER_URI")]
    docker_uri: Option<String>,

    /// Redis server to pull deployments from
    #[arg(short = 'r', long, env = "GOVERNATOR_REDIS_URI")]
    redis_uri: Option<String>,

    /// Redis queue to pull deployments from
    #[arg(short = 'q', long, env = "GOVERNATOR_REDIS_QUEUE")]
    redis_queue: Option<String>,

    /// Deploy state uri, it should include authentication
    #[arg(long, env = "DEPLOY_STATE_URI")]
    deploy_state_uri: Option<String>,

    /// The current running cluster
    #[arg(long, env = "CLUSTER")]
    cluster: Option<String>,

    /// Milliseconds to wait between deploy cycles
    #[arg(long, env = "GOVERNATOR_POLL_INTERVAL_MS")]
    poll_interval_ms: Option<u64>,

    /// Emit logs as JSON
    #[arg(long, env = "GOVERNATOR_LOG_JSON")]
    log_json: bool,
}

impl Cli {
    fn overrides(&self) -> AgentConfig {
        AgentConfig {
            docker_uri: self.docker_uri.clone(),
            redis_uri: self.redis_uri.clone(),
            redis_queue: self.redis_queue.clone(),
            deploy_state_uri: self.deploy_state_uri.clone(),
            cluster: self.cluster.clone(),
            poll_interval: self.poll_interval_ms.map(Duration::from_millis),
            redis_pool_size: None,
        }
    }

    fn load_config(&self) -> anyhow::Result<ValidatedConfig> {
        let base = match &self.config {
            Some(path) => AgentConfig::from_file(path)
                .with_context(|| format!("reading {}", path.display()))?,
            None => AgentConfig::default(),
        };
        Ok(base.merge(self.overrides()).validate()?)
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn build_deployer(config: &ValidatedConfig) -> anyhow::Result<Deployer> {
    let docker_host = DockerHost::resolve(config.docker_uri.as_deref())?;
    info!(
        docker = %docker_host.client_uri().as_deref().unwrap_or("local defaults"),
        "Connecting to docker"
    );
    let cluster = SwarmClusterControl::connect(&docker_host, DOCKER_TIMEOUT_SECS)
        .context("connecting to docker")?;

    info!("Connecting to redis...");
    let store = RedisQueueStore::connect(&config.redis_uri, config.redis_pool_size)
        .await
        .context("connecting to redis")?;
    info!("Redis connected");

    let tracker = DeployStateClient::new(&config.deploy_state_uri)?;

    Ok(Deployer::new(
        Arc::new(store),
        Arc::new(cluster),
        Arc::new(tracker),
        config.redis_queue.as_str(),
        config.cluster.as_str(),
    ))
}

/// Flip `tx` on SIGTERM or ctrl-c.
async fn watch_for_shutdown(tx: watch::Sender<bool>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Interrupt received, waiting to exit"),
        _ = terminate => info!("SIGTERM received, waiting to exit"),
    }
    let _ = tx.send(true);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = cli.load_config()?;
    let deployer = build_deployer(&config).await?;
    let worker = Worker::new(Arc::new(deployer), config.poll_interval);

    let (tx, rx) = watch::channel(false);
    tokio::spawn(watch_for_shutdown(tx));

    worker.run(rx).await;
    info!("I'll be back.");
    Ok(())
}
