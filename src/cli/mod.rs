pub mod commands;
pub mod history;
pub mod process;
pub mod scan;
pub mod serve;

pub use commands::{Cli, Commands};

use std::sync::Arc;

use crate::alert::WebhookNotifier;
use crate::config::Config;
use crate::errors::WardenError;
use crate::event::Processor;
use crate::executor::DockerExecutor;
use crate::store::ResultStore;

/// Wire the full component stack from configuration: Docker executor,
/// two-tier store, webhook alerts, event processor.
pub fn build_processor(config: Arc<Config>) -> Result<(Arc<Processor>, ResultStore), WardenError> {
    let store = ResultStore::new(&config)?;
    let executor = Arc::new(DockerExecutor::new()?);
    let alerts = Arc::new(WebhookNotifier::new(config.webhook_url.clone()));
    let processor = Arc::new(Processor::new(config, store.clone(), executor, alerts));
    Ok((processor, store))
}
