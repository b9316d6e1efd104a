pub mod notifier;

pub use notifier::{AlertSink, WebhookNotifier};

use crate::config::AlertThreshold;
use crate::models::ScanRecord;

/// Decide whether a scan crosses the configured alert threshold.
pub fn should_alert(threshold: AlertThreshold, record: &ScanRecord) -> bool {
    let critical = record.vulnerabilities.critical;
    let high = record.vulnerabilities.high;

    match threshold {
        AlertThreshold::Critical => critical > 0,
        AlertThreshold::High => critical > 0 || high > 0,
    }
}
