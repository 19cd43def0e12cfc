use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use referral_broker::{
    BrokerConfig, BrokerEndpoint, InMemoryLedgerBackend, InMemoryStateStore, Referral, batch_read,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "referral-broker")]
#[command(about = "Routes referral calls across the retail, commercial and banking ledgers")]
struct Cli {
    /// Broker configuration (JSON)
    #[arg(long)]
    config: PathBuf,
    /// Referrals to preload, keyed by partition identifier (JSON)
    #[arg(long)]
    seed: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a write-style broker function (createReferral, updateReferralStatus)
    Invoke { function: String, args: Vec<String> },
    /// Run a read-style broker function (read, searchByStatus, searchByPartner)
    Query { function: String, args: Vec<String> },
    /// Join stored values for a comma-delimited key list
    BatchRead {
        #[arg(long)]
        state: PathBuf,
        keys: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = BrokerConfig::from_json_file(&cli.config)
        .with_context(|| format!("Failed to load broker config '{}'", cli.config.display()))?;

    let ledgers = InMemoryLedgerBackend::with_partitions([
        config.partitions.retail.as_str(),
        config.partitions.commercial.as_str(),
        config.partitions.banking.as_str(),
    ])
    .await?;
    if let Some(seed) = cli.seed.as_deref() {
        seed_ledgers(&ledgers, seed).await?;
    }
    let endpoint = BrokerEndpoint::from_config(Arc::new(ledgers), config)?;

    let response = match cli.command {
        Command::Invoke { function, args } => endpoint.invoke(&function, &args).await?,
        Command::Query { function, args } => endpoint.query(&function, &args).await?,
        Command::BatchRead { state, keys } => {
            let store = load_state(&state).await?;
            batch_read(&store, &keys).await?
        }
    };

    println!("{}", String::from_utf8_lossy(&response));
    Ok(())
}

async fn seed_ledgers(ledgers: &InMemoryLedgerBackend, seed: &Path) -> Result<()> {
    let raw = fs::read_to_string(seed)
        .with_context(|| format!("Failed to read seed file '{}'", seed.display()))?;
    let by_partition: BTreeMap<String, Vec<Referral>> = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid seed file '{}'", seed.display()))?;

    for (partition_id, referrals) in by_partition {
        for referral in &referrals {
            ledgers.seed(&partition_id, referral).await.map_err(|err| {
                anyhow!("Cannot seed '{}' into '{}': {}", referral.referral_id, partition_id, err)
            })?;
        }
    }
    Ok(())
}

async fn load_state(path: &Path) -> Result<InMemoryStateStore> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read state file '{}'", path.display()))?;
    let entries: BTreeMap<String, serde_json::Value> = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid state file '{}'", path.display()))?;

    let store = InMemoryStateStore::new();
    for (key, value) in entries {
        store.put_state(key, serde_json::to_vec(&value)?).await?;
    }
    Ok(store)
}
