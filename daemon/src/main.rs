//! KYC gate daemon: entry point for running the HTTP API.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;

use kyc_chain::JsonRpcContractClient;
use kyc_crypto::to_checksum;
use kyc_provider::OnfidoClient;
use kyc_rpc::RpcServer;
use kyc_service::{KycService, ServiceConfig};
use kyc_store_lmdb::LmdbEnvironment;
use kyc_types::Address;
use kyc_utils::{init_tracing, LogFormat, ShutdownController};
use kyc_verification::Terms;

#[derive(Parser)]
#[command(name = "kyc-daemon", about = "Wallet-bound identity verification gate")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, env = "KYC_CONFIG")]
    config: Option<PathBuf>,

    /// HTTP listen port.
    #[arg(long, env = "KYC_PORT")]
    port: Option<u16>,

    /// Data directory for the record store.
    #[arg(long, env = "KYC_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// File holding the terms-of-service text users sign.
    #[arg(long, env = "KYC_TERMS_FILE")]
    terms_file: Option<PathBuf>,

    /// Identity vendor API base URL.
    #[arg(long, env = "KYC_PROVIDER_API_URL")]
    provider_api_url: Option<String>,

    /// Identity vendor API token.
    #[arg(long, env = "KYC_PROVIDER_API_TOKEN", hide_env_values = true)]
    provider_api_token: Option<String>,

    /// Shared secret for webhook HMACs.
    #[arg(long, env = "KYC_WEBHOOK_TOKEN", hide_env_values = true)]
    webhook_token: Option<String>,

    /// Ethereum JSON-RPC endpoint for contract signature checks.
    #[arg(long, env = "KYC_RPC_URL")]
    rpc_url: Option<String>,

    /// Accept lowercase (non-checksummed) addresses.
    #[arg(long, env = "KYC_ALLOW_LOWERCASE_ADDRESSES")]
    allow_lowercase_addresses: bool,

    /// Log format: "human" or "json".
    #[arg(long, env = "KYC_LOG_FORMAT")]
    log_format: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "KYC_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Start the HTTP API.
    Run,
    /// Print the hash users must sign for the configured terms file.
    TermsHash,
    /// Print an address in checksum casing.
    Checksum {
        /// Hex address, with or without `0x`.
        address: String,
    },
    /// Ask the configured chain whether an address is a contract or key-pair account.
    AccountKind {
        /// Hex address, with or without `0x`.
        address: String,
    },
    /// Print the default configuration as TOML.
    DefaultConfig,
}

fn load_config(cli: &Cli) -> anyhow::Result<ServiceConfig> {
    let mut config = match &cli.config {
        Some(path) => ServiceConfig::from_toml_file(&path.to_string_lossy())
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ServiceConfig::default(),
    };

    if let Some(port) = cli.port {
        config.listen_port = port;
    }
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(file) = &cli.terms_file {
        config.terms_file = file.clone();
    }
    if let Some(url) = &cli.provider_api_url {
        config.provider_api_url = url.clone();
    }
    if let Some(token) = &cli.provider_api_token {
        config.provider_api_token = token.clone();
    }
    if let Some(token) = &cli.webhook_token {
        config.webhook_token = token.clone();
    }
    if let Some(url) = &cli.rpc_url {
        config.rpc_url = url.clone();
    }
    if cli.allow_lowercase_addresses {
        config.checksummed_addresses = false;
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    Ok(config)
}

fn read_terms(config: &ServiceConfig) -> anyhow::Result<Terms> {
    let text = std::fs::read_to_string(&config.terms_file)
        .with_context(|| format!("reading terms from {}", config.terms_file.display()))?;
    if text.is_empty() {
        bail!("terms file {} is empty", config.terms_file.display());
    }
    Ok(Terms::new(text))
}

async fn run(config: ServiceConfig) -> anyhow::Result<()> {
    config.validate()?;
    let terms = read_terms(&config)?;
    tracing::info!(
        terms_file = %config.terms_file.display(),
        terms_hash = %terms.hash().to_hex(),
        "loaded terms"
    );

    let env = LmdbEnvironment::open(&config.data_dir, config.map_size_bytes())
        .with_context(|| format!("opening record store at {}", config.data_dir.display()))?;
    let store = Arc::new(env.record_store());

    let provider = Arc::new(OnfidoClient::with_timeout(
        config.provider_api_url.clone(),
        config.provider_api_token.clone(),
        Duration::from_secs(config.provider_timeout_secs),
    ));
    let contracts = Arc::new(JsonRpcContractClient::new(config.rpc_url.clone()));

    let port = config.listen_port;
    if config.allow_manual_override {
        tracing::warn!("manual override endpoint is enabled");
    }
    let service = Arc::new(KycService::new(config, terms, store, provider, contracts));

    let shutdown = Arc::new(ShutdownController::new());
    let signals = shutdown.clone();
    tokio::spawn(async move { signals.wait_for_signal().await });

    tracing::info!(port, "starting KYC gate");
    RpcServer::new(port)
        .start(service, shutdown.signalled())
        .await?;

    tracing::info!("KYC daemon exited cleanly");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let format: LogFormat = config.log_format.parse()?;
    init_tracing(format, &config.log_level);

    match cli.command {
        Command::Run => run(config).await,
        Command::TermsHash => {
            let terms = read_terms(&config)?;
            println!("0x{}", terms.hash().to_hex());
            Ok(())
        }
        Command::Checksum { address } => {
            let parsed = Address::parse(&address)?;
            println!("0x{}", to_checksum(&parsed));
            Ok(())
        }
        Command::AccountKind { address } => {
            let parsed = Address::parse(&address)?;
            let client = JsonRpcContractClient::new(config.rpc_url.clone());
            let kind = client
                .account_kind(&parsed)
                .await
                .with_context(|| format!("querying {}", config.rpc_url))?;
            println!("0x{}: {kind}", to_checksum(&parsed));
            Ok(())
        }
        Command::DefaultConfig => {
            print!("{}", ServiceConfig::default().to_toml_string());
            Ok(())
        }
    }
}
