pub const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS scan_records (
    scan_id TEXT PRIMARY KEY,
    image TEXT NOT NULL,
    sanitized_image_name TEXT NOT NULL,
    timestamp_str TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'UNKNOWN',
    container_type TEXT NOT NULL DEFAULT 'UNKNOWN',
    project_id TEXT,
    service_name TEXT,
    location TEXT,
    vuln_critical INTEGER DEFAULT 0,
    vuln_high INTEGER DEFAULT 0,
    vuln_medium INTEGER DEFAULT 0,
    vuln_low INTEGER DEFAULT 0,
    vuln_total INTEGER DEFAULT 0,
    compliance_passed INTEGER DEFAULT 0,
    compliance_failed INTEGER DEFAULT 0,
    blob_path TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_records_image_time
    ON scan_records(sanitized_image_name, timestamp_str);
";
