use super::commands::HistoryArgs;
use crate::config::Config;
use crate::errors::WardenError;
use crate::store::ResultStore;

pub async fn handle_history(args: HistoryArgs) -> Result<(), WardenError> {
    let config = Config::from_env()?;
    let store = ResultStore::new(&config)?;

    let records = store.list_records(args.limit)?;
    if records.is_empty() {
        println!("No scan records");
        return Ok(());
    }

    for record in &records {
        println!(
            "{}  {}  {}  critical={} high={} total={}",
            record["timestamp"].as_str().unwrap_or("-"),
            record["scan_id"].as_str().unwrap_or("-"),
            record["image"].as_str().unwrap_or("-"),
            record["vuln_critical"],
            record["vuln_high"],
            record["vuln_total"],
        );
    }
    Ok(())
}
