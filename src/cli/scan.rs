use std::sync::Arc;

use super::commands::ScanArgs;
use crate::config::Config;
use crate::errors::WardenError;
use crate::models::ServiceLabels;

pub async fn handle_scan(args: ScanArgs) -> Result<(), WardenError> {
    let config = Arc::new(Config::from_env()?);
    let (processor, _store) = super::build_processor(config)?;

    let labels = ServiceLabels::default();
    let event_id = format!("cli-{}", uuid::Uuid::new_v4());

    match processor.scan_one(&args.image, &labels, &event_id).await? {
        Some(record) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                println!(
                    "{} [{}]: {} findings (critical={}, high={})",
                    record.image,
                    record.status.as_str(),
                    record.vulnerabilities.total,
                    record.vulnerabilities.critical,
                    record.vulnerabilities.high,
                );
            }
        }
        None => println!("{}: recently scanned, skipped", args.image),
    }
    Ok(())
}
