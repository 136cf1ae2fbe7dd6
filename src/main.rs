use circle_field::{FieldConfig, FieldService, spawn_ticker};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let service = Arc::new(FieldService::from_config(FieldConfig::from_env()?)?);
    let period = service.config().tick_period;

    let first = service.snapshot().await?;
    info!(width = first.width(), height = first.height(), "first frame rendered");

    // Stand-in consumer until a transport layer subscribes to the bus.
    let mut frames = service.bus().subscribe();
    tokio::spawn(async move {
        loop {
            match frames.recv().await {
                Ok(packet) => info!(
                    generation = packet.generation,
                    ts_millis = packet.ts_millis,
                    "frame ready"
                ),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "frame consumer lagging"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Runs until the process exits.
    let ticker = spawn_ticker(service, period);
    ticker.join().await?;
    Ok(())
}
