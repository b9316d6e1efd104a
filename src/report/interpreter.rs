use serde_json::Value;
use tracing::{debug, info, warn};

use crate::image::ImageReference;
use crate::models::{
    ComplianceCheck, ComplianceSummary, ParseFailure, ScanMetadata, ScanResult, ScanStatus,
    Severity, VulnDetail, VulnerabilitySummary,
};

/// Convert raw scanner output into a normalized ScanResult. Never fails:
/// undecodable output produces a ParseError-status result carrying the raw
/// text and decode error instead.
pub fn interpret(raw_output: &str, image: &ImageReference, job_name: &str) -> ScanResult {
    let data: Value = match serde_json::from_str(raw_output) {
        Ok(data) => data,
        Err(e) => {
            warn!(error = %e, "Failed to decode scanner output as JSON");
            debug!(output = %clip(raw_output, 500), "Raw scanner output");
            return ScanResult {
                scan_id: fallback_scan_id(),
                status: ScanStatus::ParseError,
                image: image.full_name.clone(),
                vulnerabilities: VulnerabilitySummary::default(),
                compliance: ComplianceSummary::default(),
                metadata: ScanMetadata::for_image(image, job_name),
                parse_error: Some(ParseFailure {
                    error: e.to_string(),
                    raw_output: raw_output.to_string(),
                }),
            };
        }
    };

    let vulnerabilities = parse_vulnerabilities(&data);
    let compliance = parse_compliance(&data);

    info!(
        total = vulnerabilities.total,
        critical = vulnerabilities.critical,
        high = vulnerabilities.high,
        "Parsed scanner findings"
    );

    ScanResult {
        scan_id: string_field(&data, &["scanId"]).unwrap_or_else(fallback_scan_id),
        status: ScanStatus::Completed,
        image: image.full_name.clone(),
        vulnerabilities,
        compliance,
        metadata: ScanMetadata::for_image(image, job_name),
        parse_error: None,
    }
}

fn fallback_scan_id() -> String {
    chrono::Utc::now().format("%Y%m%d%H%M%S").to_string()
}

/// Prefix of at most `max_bytes`, backed off so the slice never splits a
/// multibyte character.
fn clip(output: &str, max_bytes: usize) -> &str {
    let mut end = output.len().min(max_bytes);
    while !output.is_char_boundary(end) {
        end -= 1;
    }
    &output[..end]
}

/// Locate a section array either at the top level or nested under a
/// "results" wrapper. The scanner's output shape is not stable across
/// versions; this fallback is a known inconsistency of the upstream tool,
/// not a designed contract.
fn section<'a>(data: &'a Value, name: &str) -> &'a [Value] {
    data.get(name)
        .or_else(|| data.get("results").and_then(|r| r.get(name)))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn parse_vulnerabilities(data: &Value) -> VulnerabilitySummary {
    let mut summary = VulnerabilitySummary::default();

    for vuln in section(data, "vulnerabilities") {
        let raw_severity = vuln
            .get("severity")
            .map(value_to_string)
            .unwrap_or_else(|| "UNKNOWN".to_string());
        let severity = Severity::normalize(&raw_severity);
        summary.bump(severity);

        // Field names vary between scanner versions; accept both conventions.
        let (package, version) = match vuln.get("package") {
            Some(Value::Object(package)) => (
                package.get("name").map(value_to_string),
                package.get("version").map(value_to_string),
            ),
            _ => (
                string_field(vuln, &["packageName"]),
                string_field(vuln, &["packageVersion"]),
            ),
        };

        summary.details.push(VulnDetail {
            qid: string_field(vuln, &["qid", "id"]),
            cve: string_field(vuln, &["cve", "cveId"]),
            severity,
            title: string_field(vuln, &["title", "name"]),
            package,
            version,
            fixed_version: string_field(vuln, &["fixedVersion", "fix"]),
        });
    }

    summary
}

fn parse_compliance(data: &Value) -> ComplianceSummary {
    let mut summary = ComplianceSummary::default();

    for check in section(data, "compliance") {
        let status = string_field(check, &["status"]).unwrap_or_default().to_uppercase();
        summary.total += 1;

        match status.as_str() {
            "PASS" | "PASSED" => summary.passed += 1,
            "FAIL" | "FAILED" => summary.failed += 1,
            _ => {}
        }

        summary.checks.push(ComplianceCheck {
            id: string_field(check, &["id", "checkId"]),
            title: string_field(check, &["title", "name"]),
            status,
            description: string_field(check, &["description"]),
        });
    }

    summary
}

/// First present key rendered as a string. Numeric values are accepted since
/// the scanner emits ids and severities as either strings or numbers.
fn string_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| value.get(key))
        .find(|v| !v.is_null())
        .map(value_to_string)
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> ImageReference {
        ImageReference::parse("nginx")
    }

    #[test]
    fn test_interpret_malformed_output() {
        let result = interpret("not json at all", &image(), "job-1");
        assert_eq!(result.status, ScanStatus::ParseError);
        assert_eq!(result.vulnerabilities.total, 0);
        let failure = result.parse_error.unwrap();
        assert_eq!(failure.raw_output, "not json at all");
        assert!(!failure.error.is_empty());
    }

    #[test]
    fn test_interpret_malformed_multibyte_output() {
        // The truncated debug log must not split a multibyte character; the
        // field is only rendered when a debug-level subscriber is active.
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();

        let mut raw = "x".repeat(499);
        raw.push('é');
        raw.push_str(&"y".repeat(50));

        let result = interpret(&raw, &image(), "job-1");
        assert_eq!(result.status, ScanStatus::ParseError);
        assert_eq!(result.parse_error.unwrap().raw_output, raw);
    }

    #[test]
    fn test_clip_respects_char_boundaries() {
        assert_eq!(clip("abc", 500), "abc");
        assert_eq!(clip("abcdef", 3), "abc");

        let mut s = "x".repeat(499);
        s.push('é');
        assert_eq!(clip(&s, 500), &s[..499]);
        assert_eq!(clip(&s, 501), s);
    }

    #[test]
    fn test_interpret_top_level_vulnerabilities() {
        let output = serde_json::json!({
            "scanId": "scan-42",
            "vulnerabilities": [
                {"qid": 123, "cve": "CVE-2024-0001", "severity": "HIGH",
                 "title": "thing", "package": {"name": "openssl", "version": "1.0"},
                 "fixedVersion": "1.1"}
            ]
        });
        let result = interpret(&output.to_string(), &image(), "job-1");
        assert_eq!(result.status, ScanStatus::Completed);
        assert_eq!(result.scan_id, "scan-42");
        assert_eq!(result.vulnerabilities.high, 1);
        assert_eq!(result.vulnerabilities.total, 1);
        let detail = &result.vulnerabilities.details[0];
        assert_eq!(detail.qid.as_deref(), Some("123"));
        assert_eq!(detail.cve.as_deref(), Some("CVE-2024-0001"));
        assert_eq!(detail.package.as_deref(), Some("openssl"));
        assert_eq!(detail.version.as_deref(), Some("1.0"));
        assert_eq!(detail.fixed_version.as_deref(), Some("1.1"));
    }

    #[test]
    fn test_interpret_nested_results_wrapper() {
        let output = serde_json::json!({
            "results": {
                "vulnerabilities": [
                    {"id": "V-1", "cveId": "CVE-2024-0002", "severity": 5,
                     "name": "bad", "packageName": "zlib", "packageVersion": "2.0",
                     "fix": "2.1"}
                ]
            }
        });
        let result = interpret(&output.to_string(), &image(), "job-1");
        assert_eq!(result.vulnerabilities.critical, 1);
        let detail = &result.vulnerabilities.details[0];
        assert_eq!(detail.qid.as_deref(), Some("V-1"));
        assert_eq!(detail.cve.as_deref(), Some("CVE-2024-0002"));
        assert_eq!(detail.title.as_deref(), Some("bad"));
        assert_eq!(detail.package.as_deref(), Some("zlib"));
        assert_eq!(detail.fixed_version.as_deref(), Some("2.1"));
    }

    #[test]
    fn test_interpret_numeric_severity_code() {
        let output = serde_json::json!({
            "vulnerabilities": [{"severity": "5"}, {"severity": 1}]
        });
        let result = interpret(&output.to_string(), &image(), "job-1");
        assert_eq!(result.vulnerabilities.critical, 1);
        assert_eq!(result.vulnerabilities.informational, 1);
        assert_eq!(result.vulnerabilities.total, 2);
    }

    #[test]
    fn test_interpret_missing_severity_defaults_medium() {
        let output = serde_json::json!({"vulnerabilities": [{}]});
        let result = interpret(&output.to_string(), &image(), "job-1");
        assert_eq!(result.vulnerabilities.medium, 1);
    }

    #[test]
    fn test_interpret_compliance_normalization() {
        let output = serde_json::json!({
            "compliance": [
                {"id": "C-1", "status": "PASS"},
                {"checkId": "C-2", "status": "Failed"},
                {"id": "C-3", "status": "SKIPPED"}
            ]
        });
        let result = interpret(&output.to_string(), &image(), "job-1");
        assert_eq!(result.compliance.passed, 1);
        assert_eq!(result.compliance.failed, 1);
        assert_eq!(result.compliance.total, 3);
        assert_eq!(result.compliance.checks[1].id.as_deref(), Some("C-2"));
        assert_eq!(result.compliance.checks[2].status, "SKIPPED");
    }

    #[test]
    fn test_interpret_nested_compliance() {
        let output = serde_json::json!({
            "results": {"compliance": [{"status": "passed"}]}
        });
        let result = interpret(&output.to_string(), &image(), "job-1");
        assert_eq!(result.compliance.passed, 1);
    }

    #[test]
    fn test_interpret_empty_object() {
        let result = interpret("{}", &image(), "job-1");
        assert_eq!(result.status, ScanStatus::Completed);
        assert_eq!(result.vulnerabilities.total, 0);
        assert_eq!(result.compliance.total, 0);
        // Fallback scan id is a 14-digit timestamp.
        assert_eq!(result.scan_id.len(), 14);
    }
}
