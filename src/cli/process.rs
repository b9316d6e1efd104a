use std::io::Read;
use std::sync::Arc;
use tracing::info;

use super::commands::ProcessArgs;
use crate::config::Config;
use crate::errors::WardenError;
use crate::event::EventEnvelope;

pub async fn handle_process(args: ProcessArgs) -> Result<(), WardenError> {
    let raw = if args.event == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        tokio::fs::read_to_string(&args.event).await?
    };

    let envelope: EventEnvelope = serde_json::from_str(&raw)
        .map_err(|e| WardenError::Decode(format!("Invalid event envelope: {}", e)))?;

    let config = Arc::new(Config::from_env()?);
    let (processor, _store) = super::build_processor(config)?;

    let processed = processor.process_event(&envelope).await?;
    info!(processed, "Event processed");
    println!("Processed {} image(s)", processed);
    Ok(())
}
