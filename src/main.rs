use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use courier_adapters::echo::EchoAdapterFactory;
use courier_adapters::meta::NoSuggestionFactory;
use courier_adapters::secrets::{self, JsonFileStore, SecretStore};
use courier_adapters::AdapterRegistry;
use courier_core::channel::DeliveryChannel;
use courier_core::routing::RoutingKey;
use courier_core::sequence::SequenceCounter;
use courier_delivery::{ClientRegistry, ServerConfig, WsDelivery};
use courier_dispatch::{AdapterResolver, BatchCoordinator, RunExecutor};
use courier_telemetry::{init_telemetry, TelemetryConfig};

#[derive(Parser)]
#[command(name = "courier", about = "Queue-driven chat dispatch server")]
struct Args {
    #[arg(long, env = "COURIER_HOST", default_value = "0.0.0.0")]
    host: String,

    #[arg(long, env = "COURIER_PORT", default_value_t = 9280)]
    port: u16,

    /// JSON file of flat key/value secrets merged into the environment
    /// before any record is processed.
    #[arg(long, env = "COURIER_SECRETS_FILE")]
    secrets_file: Option<PathBuf>,

    /// Human-readable log lines instead of JSON.
    #[arg(long, env = "COURIER_LOG_PLAIN")]
    plain_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_telemetry(TelemetryConfig {
        json_output: !args.plain_logs,
        ..Default::default()
    });
    tracing::info!("starting courier dispatcher");

    if let Some(path) = &args.secrets_file {
        match JsonFileStore::new(path).load() {
            Ok(loaded) => {
                let count = loaded.len();
                secrets::apply_to_env(&loaded);
                tracing::info!(count, "secrets applied to environment");
            }
            Err(error) => {
                tracing::warn!(%error, path = %path.display(), "continuing without secrets");
            }
        }
    }

    // The registry is sealed before the server starts taking batches.
    let registry = Arc::new(
        AdapterRegistry::builder()
            .register(RoutingKey::new("local", "echo"), Arc::new(EchoAdapterFactory))
            .build(),
    );
    tracing::info!(adapters = ?registry.keys(), "adapter registry ready");

    let resolver = AdapterResolver::new(registry, Arc::new(NoSuggestionFactory));
    let sequence = Arc::new(SequenceCounter::new());

    let clients = Arc::new(ClientRegistry::new(256));
    let channel: Arc<dyn DeliveryChannel> = Arc::new(WsDelivery::new(Arc::clone(&clients)));

    let executor = RunExecutor::new(resolver, sequence, Arc::clone(&channel));
    let coordinator = Arc::new(BatchCoordinator::new(executor, channel));

    let config = ServerConfig {
        host: args.host,
        port: args.port,
        ..Default::default()
    };
    let handle = courier_delivery::start(config, coordinator, clients).await?;
    tracing::info!(port = handle.port, "courier ready");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    Ok(())
}
