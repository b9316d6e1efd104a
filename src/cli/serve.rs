use std::sync::Arc;
use tracing::info;

use super::commands::ServeArgs;
use crate::api;
use crate::config::Config;
use crate::errors::WardenError;

pub async fn handle_serve(args: ServeArgs) -> Result<(), WardenError> {
    info!(host = %args.host, port = args.port, "Starting event server");

    let config = Arc::new(Config::from_env()?);
    let (processor, store) = super::build_processor(config)?;
    let app = api::build_router(api::AppState { processor, store });

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| WardenError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}
