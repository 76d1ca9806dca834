//! TavernKeeper daemon: entry point for running the keeper service.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tavern_crypto::{address_of, decode_fixed};
use tavern_keeper::{KeeperConfig, ShutdownController, Tavern};
use tavern_rpc::RpcServer;
use tavern_types::{Address, SystemClock};
use tavern_utils::{init_logging, LogFormat};

#[derive(Parser)]
#[command(name = "tavern-daemon", about = "TavernKeeper auction and staking keeper")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, env = "TAVERN_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the state snapshot.
    #[arg(long, env = "TAVERN_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Operator address (`0x…`): may pause and withdraw fees.
    #[arg(long, env = "TAVERN_OPERATOR")]
    operator: Option<Address>,

    /// Interface the HTTP server binds to.
    #[arg(long, env = "TAVERN_RPC_BIND")]
    rpc_bind: Option<String>,

    /// HTTP server port.
    #[arg(long, env = "TAVERN_RPC_PORT")]
    rpc_port: Option<u16>,

    /// Log output: "human" or "json".
    #[arg(long, env = "TAVERN_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "TAVERN_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable the test faucet endpoint.
    #[arg(long, env = "TAVERN_ENABLE_FAUCET")]
    faucet: bool,

    /// Do not serve `/metrics`.
    #[arg(long, env = "TAVERN_DISABLE_METRICS")]
    disable_metrics: bool,

    /// Neither load nor write the state snapshot.
    #[arg(long, env = "TAVERN_NO_SNAPSHOT")]
    no_snapshot: bool,

    /// Seconds between periodic snapshots; 0 writes only at shutdown.
    #[arg(long, default_value_t = 300, env = "TAVERN_SNAPSHOT_INTERVAL")]
    snapshot_interval: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the keeper and its HTTP server.
    Run,
    /// Print the default configuration as TOML.
    DefaultConfig,
    /// Print the account address an Ed25519 public key signs for.
    Address {
        /// 32-byte public key, hex.
        public_key: String,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<KeeperConfig> {
    let mut config = match cli.config {
        Some(ref path) => KeeperConfig::from_toml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => KeeperConfig::default(),
    };
    if let Some(ref dir) = cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(operator) = cli.operator {
        config.operator = operator;
    }
    if let Some(ref bind) = cli.rpc_bind {
        config.rpc_bind = bind.clone();
    }
    if let Some(port) = cli.rpc_port {
        config.rpc_port = port;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if let Some(ref level) = cli.log_level {
        config.log_level = level.clone();
    }
    config.enable_faucet |= cli.faucet;
    config.enable_metrics &= !cli.disable_metrics;
    config.persist_snapshot &= !cli.no_snapshot;
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::DefaultConfig => {
            print!("{}", KeeperConfig::default().to_toml_string()?);
            return Ok(());
        }
        Command::Address { ref public_key } => {
            let key: [u8; 32] = decode_fixed(public_key).context("public key")?;
            println!("{}", address_of(&key));
            return Ok(());
        }
        Command::Run => {}
    }

    let config = load_config(&cli)?;
    init_logging(config.log_format, &config.log_level)?;

    if config.operator.is_zero() {
        tracing::warn!("no operator configured; pause and withdrawals are unreachable");
        if config.office.fallback_holder.is_none() {
            tracing::warn!("no fallback holder either; evicted offices are left vacant");
        }
    }
    if config.enable_faucet {
        tracing::warn!("faucet enabled; balances can be minted over HTTP");
    }

    let tavern = Arc::new(Tavern::open(config.clone(), Arc::new(SystemClock))?);
    tracing::info!(
        "Starting TavernKeeper (RPC:{}, metrics:{}, snapshot:{})",
        config.rpc_addr(),
        if config.enable_metrics { "on" } else { "off" },
        if config.persist_snapshot {
            config.snapshot_path().display().to_string()
        } else {
            "off".into()
        },
    );

    let shutdown = Arc::new(ShutdownController::new());

    let server = RpcServer::new(config.rpc_addr(), Arc::clone(&tavern));
    let mut server_signal = shutdown.subscribe();
    let server_task = tokio::spawn(async move {
        server
            .start(async move { server_signal.wait().await })
            .await
    });

    if config.persist_snapshot && cli.snapshot_interval > 0 {
        let tavern = Arc::clone(&tavern);
        let mut stop = shutdown.subscribe();
        let period = Duration::from_secs(cli.snapshot_interval);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = tavern.save_snapshot().await {
                            tracing::error!(error = %e, "periodic snapshot failed");
                        }
                    }
                    _ = stop.wait() => break,
                }
            }
        });
    }

    {
        let shutdown = Arc::clone(&shutdown);
        tokio::spawn(async move { shutdown.wait_for_signal().await });
    }

    let served = server_task.await.context("RPC server task panicked")?;
    // A bind failure ends the server without a signal; stop the other tasks too.
    shutdown.shutdown();
    served?;

    if config.persist_snapshot {
        tracing::info!("Shutdown signal received, writing final snapshot");
        tavern.save_snapshot().await?;
    }

    tracing::info!("TavernKeeper daemon exited cleanly");
    Ok(())
}
