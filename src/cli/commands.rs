use clap::{Args, Parser, Subcommand};

/// Version string carrying the build metadata embedded at compile time.
fn long_version() -> String {
    format!(
        "{} ({}, built {})",
        env!("CARGO_PKG_VERSION"),
        option_env!("GIT_HASH").unwrap_or("unknown"),
        env!("BUILD_TIMESTAMP")
    )
}

#[derive(Parser)]
#[command(name = "scanwarden", version, long_version = long_version(), about = "Deployment-triggered container image vulnerability scan orchestrator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process one event envelope from a file or stdin
    Process(ProcessArgs),
    /// Scan a single image, bypassing the event path
    Scan(ScanArgs),
    /// Run the HTTP push-delivery server
    Serve(ServeArgs),
    /// List recent scan records
    History(HistoryArgs),
}

#[derive(Args, Clone)]
pub struct ProcessArgs {
    /// Path to the event envelope JSON ("-" for stdin)
    #[arg(default_value = "-")]
    pub event: String,
}

#[derive(Args, Clone)]
pub struct ScanArgs {
    /// Image reference to scan (e.g. nginx:latest, gcr.io/project/app)
    pub image: String,

    /// Output the full scan record as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone)]
pub struct ServeArgs {
    /// Listen port
    #[arg(long, default_value = "8080")]
    pub port: u16,

    /// Listen address
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,
}

#[derive(Args, Clone)]
pub struct HistoryArgs {
    /// Number of records to show
    #[arg(long, default_value = "20")]
    pub limit: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_long_version_embeds_build_metadata() {
        let version = long_version();
        assert!(version.starts_with(env!("CARGO_PKG_VERSION")));
        assert!(version.contains(env!("BUILD_TIMESTAMP")));
    }
}
