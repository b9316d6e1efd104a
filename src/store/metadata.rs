use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::errors::WardenError;
use crate::models::ScanRecord;
use crate::utils::sanitize_name;

/// SQLite-backed metadata tier: one denormalized row per scan id, queryable
/// by sanitized image name and timestamp for the recency cache.
pub struct Database {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(path: &str) -> Result<Self, WardenError> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| WardenError::Storage(format!("Failed to open database: {}", e)))?;

        // WAL mode for better concurrency
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .map_err(|e| WardenError::Storage(format!("Failed to set pragmas: {}", e)))?;

        let db = Self { conn: Arc::new(Mutex::new(conn)) };
        db.initialize()?;
        Ok(db)
    }

    pub fn in_memory() -> Result<Self, WardenError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| WardenError::Storage(format!("Failed to open in-memory db: {}", e)))?;
        let db = Self { conn: Arc::new(Mutex::new(conn)) };
        db.initialize()?;
        Ok(db)
    }

    fn initialize(&self) -> Result<(), WardenError> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(super::schema::CREATE_TABLES)
            .map_err(|e| WardenError::Storage(format!("Failed to create tables: {}", e)))?;
        Ok(())
    }

    pub fn insert_record(&self, record: &ScanRecord, blob_path: &str) -> Result<(), WardenError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO scan_records (scan_id, image, sanitized_image_name, timestamp_str, status, container_type, project_id, service_name, location, vuln_critical, vuln_high, vuln_medium, vuln_low, vuln_total, compliance_passed, compliance_failed, blob_path) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            rusqlite::params![
                record.scan_id,
                record.image,
                sanitize_name(&record.image),
                record.timestamp,
                record.status.as_str(),
                record.container_type,
                record.service.project_id,
                record.service.service_name,
                record.service.location,
                record.vulnerabilities.critical,
                record.vulnerabilities.high,
                record.vulnerabilities.medium,
                record.vulnerabilities.low,
                record.vulnerabilities.total,
                record.compliance.passed,
                record.compliance.failed,
                blob_path,
            ],
        )
        .map_err(|e| WardenError::Storage(format!("Failed to insert scan record: {}", e)))?;
        Ok(())
    }

    /// True when any record exists for the sanitized name with a timestamp at
    /// or after the cutoff. Limit 1: presence is all the recency cache needs.
    pub fn recent_scan_exists(
        &self,
        sanitized_name: &str,
        cutoff: &str,
    ) -> Result<bool, WardenError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT 1 FROM scan_records WHERE sanitized_image_name = ?1 AND timestamp_str >= ?2 LIMIT 1",
            )
            .map_err(|e| WardenError::Storage(format!("Query failed: {}", e)))?;

        let exists = stmt
            .exists(rusqlite::params![sanitized_name, cutoff])
            .map_err(|e| WardenError::Storage(format!("Query error: {}", e)))?;
        Ok(exists)
    }

    pub fn list_records(&self, limit: usize) -> Result<Vec<serde_json::Value>, WardenError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT scan_id, image, status, timestamp_str, service_name, vuln_critical, vuln_high, vuln_total, blob_path FROM scan_records ORDER BY timestamp_str DESC LIMIT ?1",
            )
            .map_err(|e| WardenError::Storage(format!("Query failed: {}", e)))?;

        let rows = stmt
            .query_map(rusqlite::params![limit as i64], |row: &rusqlite::Row| {
                Ok(serde_json::json!({
                    "scan_id": row.get::<_, String>(0)?,
                    "image": row.get::<_, String>(1)?,
                    "status": row.get::<_, String>(2)?,
                    "timestamp": row.get::<_, String>(3)?,
                    "service_name": row.get::<_, Option<String>>(4)?,
                    "vuln_critical": row.get::<_, i64>(5)?,
                    "vuln_high": row.get::<_, i64>(6)?,
                    "vuln_total": row.get::<_, i64>(7)?,
                    "blob_path": row.get::<_, String>(8)?,
                }))
            })
            .map_err(|e| WardenError::Storage(format!("Query error: {}", e)))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| WardenError::Storage(format!("Row error: {}", e)))?);
        }
        Ok(results)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self { conn: self.conn.clone() }
    }
}
